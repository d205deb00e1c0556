// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, sign-up, and password reset.
//!
//! Each flow talks to the identity provider and the profile API, then hands
//! the resulting identity to the [`SessionContext`], which decides where
//! the app lands.

use crate::models::api::AddUserRequest;
use crate::models::{Identity, LoginRole, Role};
use crate::services::identity::{IdentityError, IdentityProvider};
use crate::services::profile_api::{ApiError, ProfileApiClient};
use crate::session::context::{SessionContext, Transition};
use chrono::NaiveDate;
use std::sync::Arc;

/// Authentication flow errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthFlowError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The account exists but not for the role chosen on the login form.
    #[error("Login rejected: {0}")]
    RoleRejected(String),

    /// The role check itself could not be answered (outage, 5xx).
    #[error("Role check unavailable: {0}")]
    RoleCheckUnavailable(ApiError),

    #[error("Registration failed: {0}")]
    Registration(ApiError),
}

/// Profile details collected by the sign-up form.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub role: Role,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub dob: Option<NaiveDate>,
}

pub struct AuthFlow {
    provider: Arc<dyn IdentityProvider>,
    api: ProfileApiClient,
    context: Arc<SessionContext>,
}

impl AuthFlow {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        api: ProfileApiClient,
        context: Arc<SessionContext>,
    ) -> Self {
        Self {
            provider,
            api,
            context,
        }
    }

    /// Sign in and confirm the account matches the chosen role.
    ///
    /// If the check fails for any reason the identity is signed back out and
    /// the session is cleared. 403/404 are reported as [`AuthFlowError::RoleRejected`].
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: LoginRole,
    ) -> Result<Transition, AuthFlowError> {
        let identity = self.provider.sign_in(email, password).await?;

        if let Err(e) = self.api.check_role(email, role).await {
            tracing::info!(uid = %identity.uid, requested = ?role, error = %e, "Role check failed");
            self.context.logout().await;

            return Err(match e {
                ApiError::Status {
                    status: 403 | 404, ..
                } => AuthFlowError::RoleRejected(
                    e.detail()
                        .map(str::to_string)
                        .unwrap_or_else(|| e.to_string()),
                ),
                other => AuthFlowError::RoleCheckUnavailable(other),
            });
        }

        Ok(self.settle(identity).await)
    }

    /// Create an identity and its profile.
    ///
    /// A failed verification email is logged and does not abort sign-up.
    /// Whatever fails afterwards, the session ends consistent with the
    /// provider.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        registration: Registration,
    ) -> Result<Transition, AuthFlowError> {
        let identity = self.provider.sign_up(email, password).await?;

        if let Err(e) = self.provider.send_email_verification(&identity).await {
            tracing::warn!(uid = %identity.uid, error = %e, "Failed to send verification email");
        }

        let token = match self.provider.id_token(&identity).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(uid = %identity.uid, error = %e, "No ID token after sign-up");
                self.context.logout().await;
                return Err(e.into());
            }
        };

        let request = AddUserRequest {
            firebase_uid: identity.uid.clone(),
            email: email.trim().to_string(),
            role: registration.role,
            name: registration.name,
            photo_url: registration.photo_url,
            bio: registration.bio,
            dob: registration.dob,
        };

        match self.api.add_user(&token, &request).await {
            Ok(profile) => {
                tracing::info!(uid = %profile.uid, role = %profile.role, "Registered");
                Ok(self.settle(identity).await)
            }
            Err(e) => {
                // Identity stays signed in and settles as unregistered.
                tracing::warn!(uid = %identity.uid, error = %e, "Profile registration failed");
                self.settle(identity).await;
                Err(AuthFlowError::Registration(e))
            }
        }
    }

    /// Hand a signed-in identity to the session. If the session could not
    /// resolve it and was cleared, the provider is signed out to match.
    async fn settle(&self, identity: Identity) -> Transition {
        let transition = self.context.handle_identity_change(Some(identity)).await;
        if transition == Transition::FetchFailed {
            self.context.logout().await;
        }
        transition
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AuthFlowError> {
        self.provider.send_password_reset(email).await?;
        Ok(())
    }
}
