// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tutorly::config::Config;
use tutorly::db::FirestoreDb;
use tutorly::models::{Profile, Role, StoredProfile};
use tutorly::routes::create_router;
use tutorly::services::FirebaseTokenVerifier;
use tutorly::AppState;

#[allow(dead_code)]
pub const TEST_KID: &str = "test-key-1";
#[allow(dead_code)]
pub const TEST_PRIVATE_KEY: &[u8] = include_bytes!("../fixtures/test_rsa_private.pem");
#[allow(dead_code)]
pub const TEST_PUBLIC_KEY: &[u8] = include_bytes!("../fixtures/test_rsa_public.pem");
#[allow(dead_code)]
pub const TEST_JWKS: &str = include_str!("../fixtures/test_jwks.json");

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Claims of a Firebase ID token, as issued for the test project.
#[allow(dead_code)]
#[derive(Debug, Clone, Serialize)]
pub struct TestClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub email_verified: bool,
}

#[allow(dead_code)]
impl TestClaims {
    pub fn new(uid: &str, email: &str) -> Self {
        let project = Config::test_default().firebase_project_id;
        let now = now_secs();
        Self {
            iss: format!("https://securetoken.google.com/{}", project),
            aud: project,
            sub: uid.to_string(),
            iat: now,
            exp: now + 3600,
            email: Some(email.to_string()),
            email_verified: true,
        }
    }

    pub fn sign(&self) -> String {
        sign_with_kid(self, TEST_KID)
    }
}

#[allow(dead_code)]
fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Sign claims with the fixture private key.
#[allow(dead_code)]
pub fn sign_with_kid(claims: &TestClaims, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());

    encode(
        &header,
        claims,
        &EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY).expect("fixture private key"),
    )
    .expect("Failed to sign test ID token")
}

/// Signed ID token for `uid` with default claims.
#[allow(dead_code)]
pub fn id_token(uid: &str, email: &str) -> String {
    TestClaims::new(uid, email).sign()
}

/// Verifier that trusts only the fixture key.
#[allow(dead_code)]
pub fn test_verifier(config: &Config) -> FirebaseTokenVerifier {
    FirebaseTokenVerifier::new_with_static_key(
        config,
        TEST_KID,
        DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY).expect("fixture public key"),
    )
    .expect("Failed to build test verifier")
}

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let token_verifier = Arc::new(test_verifier(&config));

    let state = Arc::new(AppState {
        config,
        db: FirestoreDb::new_in_memory(),
        token_verifier,
    });

    (create_router(state.clone()), state)
}

/// Insert a profile directly into the store.
#[allow(dead_code)]
pub async fn seed_profile(state: &AppState, uid: &str, email: &str, role: Role) -> Profile {
    let profile = Profile {
        uid: uid.to_string(),
        name: format!("User {}", uid),
        role,
        photo_url: None,
        bio: None,
        dob: None,
    };

    state
        .db
        .create_profile(&StoredProfile::new(
            profile.clone(),
            email,
            "2026-01-01T00:00:00Z".to_string(),
        ))
        .await
        .expect("Failed to seed profile");

    profile
}
