// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tutorly API Server
//!
//! Serves application profiles to the Tutorly frontend, authenticated with
//! Firebase ID tokens.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tutorly::{
    config::{Config, ProfileStoreKind},
    db::FirestoreDb,
    services::FirebaseTokenVerifier,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Tutorly API");

    let db = match config.profile_store {
        ProfileStoreKind::Firestore => FirestoreDb::new(&config.gcp_project_id)
            .await
            .expect("Failed to connect to Firestore"),
        ProfileStoreKind::Memory => {
            tracing::warn!("Using in-memory profile store; profiles are lost on restart");
            FirestoreDb::new_in_memory()
        }
    };

    let token_verifier = Arc::new(
        FirebaseTokenVerifier::new(&config).expect("Failed to initialize ID token verifier"),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        token_verifier,
    });

    // Build router
    let app = tutorly::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tutorly=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
