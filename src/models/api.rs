// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request and response bodies shared by the profile API and its client.

use crate::models::{LoginRole, Role};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub const MAX_NAME_LEN: u64 = 100;
pub const MAX_BIO_LEN: u64 = 2000;

/// Body of `POST /api/add-user`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AddUserRequest {
    #[validate(length(min = 1, max = 128))]
    pub firebase_uid: String,
    #[validate(email)]
    pub email: String,
    pub role: Role,
    #[validate(length(min = 1, max = MAX_NAME_LEN))]
    pub name: String,
    #[serde(default)]
    #[validate(url)]
    pub photo_url: Option<String>,
    #[serde(default)]
    #[validate(length(max = MAX_BIO_LEN))]
    pub bio: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub dob: Option<NaiveDate>,
}

/// Body of `POST /api/check-role`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckRoleRequest {
    pub email: String,
    pub role: LoginRole,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckRoleResponse {
    pub role: Role,
}
