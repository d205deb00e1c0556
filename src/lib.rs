// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tutorly: profile API and role-gated session handling for a tutoring
//! marketplace.
//!
//! The server half exposes profile lookup, registration, and login role
//! checks behind Firebase ID tokens. The client half (`session`) turns
//! identity provider events into a session snapshot and decides which
//! views a user may see.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::FirebaseTokenVerifier;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub token_verifier: Arc<FirebaseTokenVerifier>,
}
