// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider client (Firebase Auth REST API).
//!
//! The provider owns sign-in state. Every change is published on a
//! `watch` channel so the session context can follow it.

use crate::config::ClientConfig;
use crate::models::Identity;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
/// Refresh ID tokens this long before they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Identity provider errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account already exists for this email")]
    EmailExists,

    #[error("Password is too weak: {0}")]
    WeakPassword(String),

    #[error("No identity is signed in")]
    NotSignedIn,

    #[error("Identity provider rejected the request: {0}")]
    Rejected(String),

    #[error("Identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Operations the application may trigger on the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password; publishes the new identity.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;

    /// Create an identity; publishes it as signed in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;

    /// Sign out; publishes `None`.
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// A fresh bearer token for `identity`.
    async fn id_token(&self, identity: &Identity) -> Result<String, IdentityError>;

    async fn send_email_verification(&self, identity: &Identity) -> Result<(), IdentityError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError>;

    /// Subscribe to sign-in state changes.
    fn identity_changes(&self) -> watch::Receiver<Option<Identity>>;
}

#[derive(Clone)]
struct TokenSet {
    uid: String,
    id_token: String,
    refresh_token: String,
    expires_at: Instant,
}

/// Firebase Auth REST client.
pub struct FirebaseIdentityClient {
    http_client: reqwest::Client,
    api_key: String,
    auth_url: String,
    token_url: String,
    tokens: RwLock<Option<TokenSet>>,
    changes: watch::Sender<Option<Identity>>,
}

impl FirebaseIdentityClient {
    pub fn new(config: &ClientConfig) -> Result<Self, IdentityError> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()?;

        let (changes, _) = watch::channel(None);

        Ok(Self {
            http_client,
            api_key: config.firebase_api_key.clone(),
            auth_url: config.firebase_auth_url.clone(),
            token_url: config.firebase_token_url.clone(),
            tokens: RwLock::new(None),
            changes,
        })
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, IdentityError>
    where
        B: Serialize + ?Sized + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/accounts:{}", self.auth_url, method);
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<FirebaseErrorBody>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.to_string());
            tracing::debug!(method, %status, message = %message, "Firebase Auth call rejected");
            return Err(map_firebase_error(&message));
        }

        Ok(response.json().await?)
    }

    /// Look up the account behind an ID token (for `emailVerified`).
    async fn lookup(&self, id_token: &str) -> Result<Identity, IdentityError> {
        let response: LookupResponse = self
            .call("lookup", &serde_json::json!({ "idToken": id_token }))
            .await?;

        let user = response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| IdentityError::Rejected("USER_NOT_FOUND".to_string()))?;

        Ok(Identity {
            uid: user.local_id,
            email: user.email,
            email_verified: user.email_verified,
        })
    }

    async fn establish(&self, auth: AuthResponse) -> Result<Identity, IdentityError> {
        let identity = match self.lookup(&auth.id_token).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    uid = %auth.local_id,
                    "Account lookup failed; assuming unverified email"
                );
                Identity {
                    uid: auth.local_id.clone(),
                    email: auth.email.clone(),
                    email_verified: false,
                }
            }
        };

        *self.tokens.write().await = Some(TokenSet {
            uid: auth.local_id,
            id_token: auth.id_token,
            refresh_token: auth.refresh_token,
            expires_at: Instant::now() + parse_expires_in(&auth.expires_in),
        });

        self.changes.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn refresh(&self, current: &TokenSet) -> Result<String, IdentityError> {
        let url = format!("{}/token", self.token_url);
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", current.refresh_token.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(%status, uid = %current.uid, "ID token refresh rejected");
            return Err(IdentityError::Rejected(format!(
                "token refresh returned {}",
                status
            )));
        }

        let refreshed: RefreshResponse = response.json().await?;
        let id_token = refreshed.id_token.clone();

        *self.tokens.write().await = Some(TokenSet {
            uid: refreshed.user_id,
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: Instant::now() + parse_expires_in(&refreshed.expires_in),
        });

        tracing::debug!(uid = %current.uid, "ID token refreshed");
        Ok(id_token)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let auth: AuthResponse = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        tracing::info!(uid = %auth.local_id, "Signed in");
        self.establish(auth).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let auth: AuthResponse = self
            .call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        tracing::info!(uid = %auth.local_id, "Identity created");
        self.establish(auth).await
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        // Firebase sessions are client-side; dropping the tokens is the sign-out.
        self.tokens.write().await.take();
        self.changes.send_replace(None);
        Ok(())
    }

    async fn id_token(&self, identity: &Identity) -> Result<String, IdentityError> {
        let current = self
            .tokens
            .read()
            .await
            .clone()
            .filter(|t| t.uid == identity.uid)
            .ok_or(IdentityError::NotSignedIn)?;

        if current.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
            return Ok(current.id_token);
        }

        self.refresh(&current).await
    }

    async fn send_email_verification(&self, identity: &Identity) -> Result<(), IdentityError> {
        let id_token = self.id_token(identity).await?;
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                &serde_json::json!({ "requestType": "VERIFY_EMAIL", "idToken": id_token }),
            )
            .await?;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                &serde_json::json!({ "requestType": "PASSWORD_RESET", "email": email }),
            )
            .await?;
        Ok(())
    }

    fn identity_changes(&self) -> watch::Receiver<Option<Identity>> {
        self.changes.subscribe()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    user_id: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

#[derive(Deserialize)]
struct FirebaseErrorBody {
    error: FirebaseErrorDetail,
}

#[derive(Deserialize)]
struct FirebaseErrorDetail {
    message: String,
}

fn map_firebase_error(message: &str) -> IdentityError {
    // Messages look like "WEAK_PASSWORD : Password should be at least 6 characters".
    let (code, detail) = message
        .split_once(" : ")
        .map(|(c, d)| (c.trim(), d.trim()))
        .unwrap_or((message.trim(), ""));

    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            IdentityError::InvalidCredentials
        }
        "EMAIL_EXISTS" => IdentityError::EmailExists,
        "WEAK_PASSWORD" => IdentityError::WeakPassword(detail.to_string()),
        _ => IdentityError::Rejected(message.to_string()),
    }
}

fn parse_expires_in(raw: &str) -> Duration {
    Duration::from_secs(raw.trim().parse().unwrap_or(3600))
}
