// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side session: who is signed in, which views they may see, and
//! the flows that change it.

pub mod context;
pub mod flow;
pub mod navigation;
pub mod state;

pub use context::{SessionContext, Transition};
pub use flow::{AuthFlow, AuthFlowError, Registration};
pub use navigation::{landing, resolve, AppRoute, GuardDecision, Navigator, RoleGuard};
pub use state::{Session, SessionPhase};
