// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development. The server reads
//! [`Config`]; the session client reads [`ClientConfig`].

use std::env;
use std::str::FromStr;

/// Default Firebase Auth REST endpoint (override for the auth emulator).
pub const DEFAULT_FIREBASE_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Default Firebase token refresh endpoint.
pub const DEFAULT_FIREBASE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Where profiles are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStoreKind {
    Firestore,
    /// Process-local map; data is lost on restart.
    Memory,
}

impl FromStr for ProfileStoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("PROFILE_STORE", s.to_string())),
        }
    }
}

/// Server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase project ID (ID token audience)
    pub firebase_project_id: String,
    /// GCP project ID hosting Firestore
    pub gcp_project_id: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Profile persistence backend
    pub profile_store: ProfileStoreKind,
}

impl Config {
    /// Config for tests: in-memory store, fixed project.
    pub fn test_default() -> Self {
        Self {
            firebase_project_id: "tutorly-test".to_string(),
            gcp_project_id: "tutorly-test".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            profile_store: ProfileStoreKind::Memory,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let firebase_project_id =
            required("FIREBASE_PROJECT_ID", env::var("FIREBASE_PROJECT_ID"))?;

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .map(|v| v.trim().to_string())
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| firebase_project_id.clone()),
            firebase_project_id,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            profile_store: env::var("PROFILE_STORE")
                .map(|v| v.parse())
                .unwrap_or(Ok(ProfileStoreKind::Firestore))?,
        })
    }
}

/// Session client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the profile API (no trailing slash)
    pub api_base_url: String,
    /// Firebase Web API key
    pub firebase_api_key: String,
    /// Firebase Auth REST base URL
    pub firebase_auth_url: String,
    /// Firebase token refresh base URL
    pub firebase_token_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string())
                .trim_end_matches('/')
                .to_string(),
            firebase_api_key: required("FIREBASE_API_KEY", env::var("FIREBASE_API_KEY"))?,
            firebase_auth_url: env::var("FIREBASE_AUTH_URL")
                .unwrap_or_else(|_| DEFAULT_FIREBASE_AUTH_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            firebase_token_url: env::var("FIREBASE_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_FIREBASE_TOKEN_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// Trimmed value of a required variable. Unset and blank are both missing.
fn required(
    name: &'static str,
    value: Result<String, env::VarError>,
) -> Result<String, ConfigError> {
    match value.map(|v| v.trim().to_string()) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("FIREBASE_PROJECT_ID", "tutorly-dev");
        env::set_var("PROFILE_STORE", "memory");
        env::set_var("FIREBASE_API_KEY", "test-api-key");
        env::set_var("API_BASE_URL", "http://api.local/");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.firebase_project_id, "tutorly-dev");
        assert_eq!(config.profile_store, ProfileStoreKind::Memory);

        let client = ClientConfig::from_env().expect("Client config should load");
        assert_eq!(client.firebase_api_key, "test-api-key");
        assert_eq!(client.api_base_url, "http://api.local");
    }

    #[test]
    fn blank_required_value_is_missing() {
        for blank in ["", "   ", "\t\n"] {
            assert!(matches!(
                required("FIREBASE_PROJECT_ID", Ok(blank.to_string())),
                Err(ConfigError::Missing("FIREBASE_PROJECT_ID"))
            ));
        }
        assert!(matches!(
            required("FIREBASE_PROJECT_ID", Err(env::VarError::NotPresent)),
            Err(ConfigError::Missing("FIREBASE_PROJECT_ID"))
        ));
        assert_eq!(
            required("FIREBASE_PROJECT_ID", Ok(" tutorly-dev \n".to_string())).unwrap(),
            "tutorly-dev"
        );
    }

    #[test]
    fn profile_store_kind_rejects_unknown() {
        assert_eq!(
            "Firestore".parse::<ProfileStoreKind>().unwrap(),
            ProfileStoreKind::Firestore
        );
        assert!(matches!(
            "postgres".parse::<ProfileStoreKind>(),
            Err(ConfigError::Invalid("PROFILE_STORE", _))
        ));
    }
}
