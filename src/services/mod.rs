// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - outbound integrations.

pub mod firebase_auth;
pub mod identity;
pub mod profile_api;

pub use firebase_auth::{FirebaseTokenVerifier, TokenError, VerifiedIdentity};
pub use identity::{FirebaseIdentityClient, IdentityError, IdentityProvider};
pub use profile_api::{ApiError, ProfileApiClient, ProfileFetcher};
