// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase ID token authentication middleware.

use crate::error::AppError;
use crate::services::firebase_auth::{extract_bearer_token, TokenError};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated caller extracted from a verified ID token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
}

/// Middleware that requires a valid Firebase ID token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = extract_bearer_token(auth_header).map_err(|_| AppError::Unauthorized)?;

    let identity = state
        .token_verifier
        .verify(token)
        .await
        .map_err(|err| match err {
            TokenError::Unauthorized(reason) => {
                tracing::debug!(reason = %reason, "Rejected bearer token");
                AppError::InvalidToken
            }
            TokenError::Transient(reason) => AppError::IdentityProvider(reason),
        })?;

    request.extensions_mut().insert(AuthUser {
        uid: identity.uid,
        email: identity.email,
        email_verified: identity.email_verified,
    });

    Ok(next.run(request).await)
}
