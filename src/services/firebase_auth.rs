// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase ID token verification for API bearer tokens.

use crate::config::Config;
use anyhow::Context;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

const SECURETOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// Identity proven by a valid Firebase ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
}

/// Token verification error categories.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TokenError {
    /// The token is missing/invalid or claims do not match expectations.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Signing keys could not be fetched.
    #[error("transient: {0}")]
    Transient(String),
}

enum KeySource {
    Jwks {
        url: String,
    },
    StaticKey {
        kid: String,
        decoding_key: Arc<DecodingKey>,
    },
}

struct JwksCacheEntry {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

/// Verifier for Firebase Auth ID tokens.
pub struct FirebaseTokenVerifier {
    http_client: reqwest::Client,
    project_id: String,
    expected_issuer: String,
    keys: KeySource,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl FirebaseTokenVerifier {
    /// Create a production verifier that fetches and caches the securetoken JWKS.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_jwks_url(config, SECURETOKEN_JWKS_URL)
    }

    /// Create a verifier against a custom JWKS endpoint.
    pub fn with_jwks_url(config: &Config, jwks_url: impl Into<String>) -> anyhow::Result<Self> {
        let verifier = Self::build(
            config,
            KeySource::Jwks {
                url: jwks_url.into(),
            },
        )?;

        tracing::info!(
            project_id = %verifier.project_id,
            expected_issuer = %verifier.expected_issuer,
            "Initialized Firebase ID token verifier"
        );

        Ok(verifier)
    }

    /// Create a verifier with a static RSA public key.
    ///
    /// This is intended for deterministic local/integration tests.
    pub fn new_with_static_key(
        config: &Config,
        kid: impl Into<String>,
        decoding_key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static key kid must not be empty");
        }

        Self::build(
            config,
            KeySource::StaticKey {
                kid,
                decoding_key: Arc::new(decoding_key),
            },
        )
    }

    fn build(config: &Config, keys: KeySource) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building JWKS HTTP client")?;

        Ok(Self {
            http_client,
            project_id: config.firebase_project_id.clone(),
            expected_issuer: format!(
                "https://securetoken.google.com/{}",
                config.firebase_project_id
            ),
            keys,
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Verify a raw Firebase ID token (without the `Bearer ` prefix).
    pub async fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenError> {
        let header = decode_header(token)
            .map_err(|e| TokenError::Unauthorized(format!("invalid JWT header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(TokenError::Unauthorized(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| TokenError::Unauthorized("missing JWT kid".to_string()))?;

        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&[self.expected_issuer.as_str()]);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        let claims = decode::<FirebaseIdTokenClaims>(token, decoding_key.as_ref(), &validation)
            .map_err(|e| TokenError::Unauthorized(format!("JWT validation failed: {e}")))?
            .claims;

        validate_iat(claims.iat)?;

        if claims.sub.is_empty() || claims.sub.len() > 128 {
            return Err(TokenError::Unauthorized(
                "sub claim must be 1-128 characters".to_string(),
            ));
        }

        tracing::debug!(
            uid = %claims.sub,
            email_verified = ?claims.email_verified,
            "Firebase ID token verified"
        );

        Ok(VerifiedIdentity {
            uid: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified.unwrap_or(false),
        })
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, TokenError> {
        let jwks_url = match &self.keys {
            KeySource::StaticKey {
                kid: static_kid,
                decoding_key,
            } => {
                if kid == static_kid {
                    return Ok(decoding_key.clone());
                }

                return Err(TokenError::Unauthorized(format!(
                    "unknown JWT kid for static verifier: {kid}"
                )));
            }
            KeySource::Jwks { url } => url,
        };

        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        // Keys rotate; a kid we have never seen forces one refetch.
        for force_refresh in [false, true] {
            self.refresh_jwks(jwks_url, force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(TokenError::Unauthorized(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, jwks_url: &str, force_refresh: bool) -> Result<(), TokenError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if cache
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
            {
                return Ok(());
            }
        }

        tracing::debug!(jwks_url = %jwks_url, "Refreshing securetoken JWKS cache");

        let response = self
            .http_client
            .get(jwks_url)
            .send()
            .await
            .map_err(|e| TokenError::Transient(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TokenError::Transient(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| TokenError::Transient(format!("invalid JWKS JSON: {e}")))?;

        let mut keys_by_kid: HashMap<String, Arc<DecodingKey>> = HashMap::new();

        for jwk in jwks.keys {
            if jwk.kty != "RSA" || jwk.kid.trim().is_empty() {
                continue;
            }

            if jwk.alg.as_deref().is_some_and(|alg| alg != "RS256") {
                continue;
            }

            if jwk.use_.as_deref().is_some_and(|use_| use_ != "sig") {
                continue;
            }

            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys_by_kid.insert(jwk.kid, Arc::new(key));
                }
                Err(e) => {
                    tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
                }
            }
        }

        if keys_by_kid.is_empty() {
            return Err(TokenError::Transient(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        *self.jwks_cache.write().await = Some(JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "Securetoken JWKS cache refreshed");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirebaseIdTokenClaims {
    sub: String,
    iat: Option<usize>,
    email: Option<String>,
    email_verified: Option<bool>,
}

/// Strip the `Bearer ` scheme from an Authorization header value.
pub fn extract_bearer_token(value: Option<&str>) -> Result<&str, TokenError> {
    let value =
        value.ok_or_else(|| TokenError::Unauthorized("missing Authorization header".to_string()))?;

    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        TokenError::Unauthorized("Authorization header must be Bearer token".to_string())
    })?;

    if token.is_empty() {
        return Err(TokenError::Unauthorized("Bearer token is empty".to_string()));
    }

    Ok(token)
}

fn validate_iat(iat: Option<usize>) -> Result<(), TokenError> {
    let Some(iat) = iat else {
        return Err(TokenError::Unauthorized("missing iat claim".to_string()));
    };

    if iat as u64 > now_unix_secs() + CLOCK_SKEW_SECS {
        return Err(TokenError::Unauthorized(
            "iat claim is in the future".to_string(),
        ));
    }

    Ok(())
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    value
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|raw| raw.trim_matches('"').parse::<u64>().ok())
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
