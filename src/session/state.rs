// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session snapshot shared with every view.

use crate::models::{Identity, Profile, Role};

/// Who is signed in and what they may see.
///
/// When `loading` is false the pair `(identity, profile)` is terminal for
/// the current navigation: both empty, identity without profile (pending
/// registration), or both present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
    pub loading: bool,
}

/// Position in the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Registered,
    Unregistered,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            return SessionPhase::Authenticating;
        }
        match (&self.identity, &self.profile) {
            (Some(_), Some(_)) => SessionPhase::Registered,
            (Some(_), None) => SessionPhase::Unregistered,
            (None, _) => SessionPhase::Anonymous,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }
}
