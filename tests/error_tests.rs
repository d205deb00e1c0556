// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use tutorly::error::AppError;

#[test]
fn test_status_mapping() {
    assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        AppError::Forbidden("x".to_string()).status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        AppError::Conflict("x".to_string()).status(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        AppError::IdentityProvider("jwks down".to_string()).status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        AppError::Internal(anyhow::anyhow!("boom")).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_internal_details_are_not_leaked() {
    let response = AppError::Database("connection string secret".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "database_error");
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn test_client_errors_carry_details() {
    let response = AppError::Conflict("Profile for alice already exists".to_string()).into_response();

    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "conflict");
    assert_eq!(json["details"], "Profile for alice already exists");
}
