// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the profile API, used by the session layer.
//!
//! No retries and no caching: every call is a fresh request.

use crate::config::ClientConfig;
use crate::models::api::{AddUserRequest, CheckRoleRequest, CheckRoleResponse};
use crate::models::{LoginRole, Profile};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Profile API client errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The identity has no application profile yet.
    #[error("Profile not registered")]
    NotRegistered,

    #[error("API returned {status}: {error}")]
    Status {
        status: u16,
        error: String,
        details: Option<String>,
    },

    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// Human-readable detail from the error body, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { details, .. } => details.as_deref(),
            _ => None,
        }
    }
}

/// Translates an identity token into an application profile.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    /// `Err(ApiError::NotRegistered)` on 404.
    async fn fetch_profile(&self, token: &str, uid: &str) -> Result<Profile, ApiError>;
}

/// Error body shape returned by the API.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// Profile API client.
#[derive(Clone)]
pub struct ProfileApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ProfileApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `POST /api/add-user`: create the caller's profile.
    pub async fn add_user(
        &self,
        token: &str,
        request: &AddUserRequest,
    ) -> Result<Profile, ApiError> {
        let response = self
            .http_client
            .post(format!("{}/api/add-user", self.base_url))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        Ok(error_for_status(response).await?.json().await?)
    }

    /// `POST /api/check-role`: confirm the login form's role choice.
    pub async fn check_role(
        &self,
        email: &str,
        role: LoginRole,
    ) -> Result<CheckRoleResponse, ApiError> {
        let response = self
            .http_client
            .post(format!("{}/api/check-role", self.base_url))
            .json(&CheckRoleRequest {
                email: email.to_string(),
                role,
            })
            .send()
            .await?;

        Ok(error_for_status(response).await?.json().await?)
    }
}

#[async_trait]
impl ProfileFetcher for ProfileApiClient {
    async fn fetch_profile(&self, token: &str, uid: &str) -> Result<Profile, ApiError> {
        let url = format!("{}/api/user/{}", self.base_url, urlencoding::encode(uid));
        let response = self.http_client.get(url).bearer_auth(token).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotRegistered);
        }

        Ok(error_for_status(response).await?.json().await?)
    }
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let (error, details) = match response.json::<ErrorBody>().await {
        Ok(body) => (body.error, body.details),
        Err(_) => (status.to_string(), None),
    };

    Err(ApiError::Status {
        status: status.as_u16(),
        error,
        details,
    })
}
