// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase ID token verification against a mocked securetoken JWKS.

use mockito::Server;
use tutorly::config::Config;
use tutorly::services::{FirebaseTokenVerifier, TokenError};

mod common;

use common::{id_token, sign_with_kid, test_verifier, TestClaims, TEST_JWKS};

fn jwks_verifier(server: &Server) -> FirebaseTokenVerifier {
    FirebaseTokenVerifier::with_jwks_url(&Config::test_default(), format!("{}/jwks", server.url()))
        .expect("Failed to build verifier")
}

#[tokio::test]
async fn test_valid_token_verifies_and_keys_are_cached() {
    let mut server = Server::new_async().await;
    let jwks = server
        .mock("GET", "/jwks")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("cache-control", "public, max-age=3600, must-revalidate")
        .with_body(TEST_JWKS)
        .expect(1)
        .create_async()
        .await;

    let verifier = jwks_verifier(&server);
    let token = id_token("alice", "alice@example.com");

    let first = verifier.verify(&token).await.unwrap();
    assert_eq!(first.uid, "alice");
    assert_eq!(first.email.as_deref(), Some("alice@example.com"));
    assert!(first.email_verified);

    // Served from cache.
    let second = verifier.verify(&token).await.unwrap();
    assert_eq!(second, first);

    jwks.assert_async().await;
}

#[tokio::test]
async fn test_unknown_kid_forces_one_refetch() {
    let mut server = Server::new_async().await;
    let jwks = server
        .mock("GET", "/jwks")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TEST_JWKS)
        .expect(2)
        .create_async()
        .await;

    let verifier = jwks_verifier(&server);
    let token = sign_with_kid(&TestClaims::new("alice", "alice@example.com"), "rotated-key");

    assert!(matches!(
        verifier.verify(&token).await,
        Err(TokenError::Unauthorized(_))
    ));
    jwks.assert_async().await;
}

#[tokio::test]
async fn test_jwks_outage_is_transient() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/jwks")
        .with_status(503)
        .create_async()
        .await;

    let verifier = jwks_verifier(&server);
    let token = id_token("alice", "alice@example.com");

    assert!(matches!(
        verifier.verify(&token).await,
        Err(TokenError::Transient(_))
    ));
}

#[tokio::test]
async fn test_wrong_audience_is_rejected() {
    let verifier = test_verifier(&Config::test_default());

    let mut claims = TestClaims::new("alice", "alice@example.com");
    claims.aud = "another-project".to_string();

    assert!(matches!(
        verifier.verify(&claims.sign()).await,
        Err(TokenError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_wrong_issuer_is_rejected() {
    let verifier = test_verifier(&Config::test_default());

    let mut claims = TestClaims::new("alice", "alice@example.com");
    claims.iss = "https://accounts.google.com".to_string();

    assert!(matches!(
        verifier.verify(&claims.sign()).await,
        Err(TokenError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_future_iat_is_rejected() {
    let verifier = test_verifier(&Config::test_default());

    let mut claims = TestClaims::new("alice", "alice@example.com");
    claims.iat += 3600;
    claims.exp += 3600;

    assert!(matches!(
        verifier.verify(&claims.sign()).await,
        Err(TokenError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_unverified_email_is_reported() {
    let verifier = test_verifier(&Config::test_default());

    let mut claims = TestClaims::new("alice", "alice@example.com");
    claims.email_verified = false;

    let identity = verifier.verify(&claims.sign()).await.unwrap();
    assert!(!identity.email_verified);
}
