// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity record owned by the external identity provider.

use serde::{Deserialize, Serialize};

/// A signed-in identity as reported by Firebase Auth.
///
/// The application never mutates this; it only asks the provider to sign in,
/// sign out, or send verification/reset emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
}
