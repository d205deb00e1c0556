// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile routes: lookup, registration, update, and login role checks.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::api::{
    AddUserRequest, CheckRoleRequest, CheckRoleResponse, MAX_BIO_LEN, MAX_NAME_LEN,
};
use crate::models::{Profile, ProfileUpdate, Role, StoredProfile};
use crate::time_utils::{check_dob, format_utc_rfc3339};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use validator::Validate;

/// Profile routes that require a verified ID token.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user/{uid}", get(get_user).put(update_user))
        .route("/api/add-user", post(add_user))
}

/// Routes called before sign-in completes.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/check-role", post(check_role))
}

// ─── Lookup ──────────────────────────────────────────────────

/// Get a profile by uid. Callers may read their own profile; admins may
/// read any.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(uid): Path<String>,
) -> Result<Json<Profile>> {
    if caller.uid != uid && !caller_is_admin(&state, &caller).await? {
        tracing::warn!(caller = %caller.uid, target = %uid, "Blocked cross-user profile read");
        return Err(AppError::Forbidden(
            "Cannot read another user's profile".to_string(),
        ));
    }

    let stored = state
        .db
        .get_profile(&uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", uid)))?;

    Ok(Json(stored.profile()))
}

async fn caller_is_admin(state: &AppState, caller: &AuthUser) -> Result<bool> {
    Ok(state
        .db
        .get_profile(&caller.uid)
        .await?
        .is_some_and(|p| p.role == Role::Admin))
}

// ─── Registration ────────────────────────────────────────────

/// Create the caller's profile after a successful identity sign-up.
async fn add_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(body): Json<AddUserRequest>,
) -> Result<(StatusCode, Json<Profile>)> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if body.firebase_uid != caller.uid {
        return Err(AppError::Forbidden(
            "firebase_uid does not match the authenticated identity".to_string(),
        ));
    }

    if let Some(token_email) = &caller.email {
        if !token_email.eq_ignore_ascii_case(body.email.trim()) {
            return Err(AppError::Forbidden(
                "email does not match the authenticated identity".to_string(),
            ));
        }
    }

    if !body.role.is_self_assignable() {
        return Err(AppError::BadRequest(format!(
            "Role {} cannot be chosen at sign-up",
            body.role
        )));
    }

    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be blank".to_string()));
    }

    let now = chrono::Utc::now();
    if let Some(dob) = body.dob {
        check_dob(dob, now).map_err(|e| AppError::BadRequest(e.to_string()))?;
    }

    let profile = Profile {
        uid: body.firebase_uid,
        name: name.to_string(),
        role: body.role,
        photo_url: body.photo_url,
        bio: body.bio,
        dob: body.dob,
    };

    let stored = StoredProfile::new(profile, &body.email, format_utc_rfc3339(now));
    state.db.create_profile(&stored).await?;

    tracing::info!(uid = %stored.uid, role = %stored.role, "Profile created");

    Ok((StatusCode::CREATED, Json(stored.profile())))
}

// ─── Update ──────────────────────────────────────────────────

/// Update the caller's own profile. The role is never changed here.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(uid): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>> {
    if caller.uid != uid {
        return Err(AppError::Forbidden(
            "Cannot update another user's profile".to_string(),
        ));
    }

    if let Some(name) = &update.name {
        let len = name.trim().chars().count() as u64;
        if len == 0 || len > MAX_NAME_LEN {
            return Err(AppError::BadRequest(format!(
                "name must be 1-{} characters",
                MAX_NAME_LEN
            )));
        }
    }
    if update
        .bio
        .as_ref()
        .is_some_and(|bio| bio.chars().count() as u64 > MAX_BIO_LEN)
    {
        return Err(AppError::BadRequest(format!(
            "bio must be at most {} characters",
            MAX_BIO_LEN
        )));
    }

    if let Some(dob) = update.dob {
        check_dob(dob, chrono::Utc::now()).map_err(|e| AppError::BadRequest(e.to_string()))?;
    }

    let stored = state
        .db
        .update_profile(&uid, update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", uid)))?;

    tracing::info!(uid = %uid, "Profile updated");

    Ok(Json(stored.profile()))
}

// ─── Login Role Check ────────────────────────────────────────

/// Confirm that the account behind `email` matches the role chosen on the
/// login form.
async fn check_role(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CheckRoleRequest>,
) -> Result<Json<CheckRoleResponse>> {
    let stored = state
        .db
        .find_profile_by_email(&body.email)
        .await?
        .ok_or_else(|| AppError::NotFound("No account for this email".to_string()))?;

    if !stored.role.matches_login(body.role) {
        tracing::info!(
            uid = %stored.uid,
            requested = ?body.role,
            actual = %stored.role,
            "Login role mismatch"
        );
        return Err(AppError::Forbidden(
            "Account is not registered for the selected role".to_string(),
        ));
    }

    Ok(Json(CheckRoleResponse { role: stored.role }))
}
