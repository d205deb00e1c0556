// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application profile and role model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Role carried by every profile.
///
/// `Individual` and `Mass` are the two tutor kinds (solo tutor and
/// class-based tutor). Serialized exactly as the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Role {
    Student,
    Individual,
    Mass,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Individual => "Individual",
            Role::Mass => "Mass",
            Role::Admin => "Admin",
        }
    }

    pub fn is_student(&self) -> bool {
        matches!(self, Role::Student)
    }

    pub fn is_tutor(&self) -> bool {
        matches!(self, Role::Individual | Role::Mass)
    }

    /// Whether a user may pick this role for themselves at sign-up.
    pub fn is_self_assignable(&self) -> bool {
        !matches!(self, Role::Admin)
    }

    /// Whether this role satisfies the coarse choice made on the login form.
    pub fn matches_login(&self, login: LoginRole) -> bool {
        match login {
            LoginRole::Student => self.is_student(),
            LoginRole::Tutor => self.is_tutor(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive on the canonical names only. Legacy spellings such
    /// as `tutor` are rejected; use [`LoginRole`] for the login form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "individual" => Ok(Role::Individual),
            "mass" => Ok(Role::Mass),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The two choices offered by the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum LoginRole {
    Student,
    Tutor,
}

/// Application profile, stored in the `users` collection keyed by uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    /// Identity provider uid (also the document ID)
    pub uid: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    /// Date of birth (`YYYY-MM-DD`)
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub dob: Option<NaiveDate>,
}

/// Profile as persisted, with the lookup fields the API never returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub uid: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    /// Lowercased email, used by role checks at login
    pub email: String,
    /// When the profile was created (RFC 3339)
    pub created_at: String,
}

impl StoredProfile {
    pub fn new(profile: Profile, email: &str, created_at: String) -> Self {
        Self {
            uid: profile.uid,
            name: profile.name,
            role: profile.role,
            photo_url: profile.photo_url,
            bio: profile.bio,
            dob: profile.dob,
            email: email.trim().to_ascii_lowercase(),
            created_at,
        }
    }

    pub fn profile(&self) -> Profile {
        Profile {
            uid: self.uid.clone(),
            name: self.name.clone(),
            role: self.role,
            photo_url: self.photo_url.clone(),
            bio: self.bio.clone(),
            dob: self.dob,
        }
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        let mut profile = self.profile();
        update.apply(&mut profile);
        self.name = profile.name;
        self.photo_url = profile.photo_url;
        self.bio = profile.bio;
        self.dob = profile.dob;
    }
}

/// Editable subset of a profile. `role` is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub dob: Option<NaiveDate>,
}

impl ProfileUpdate {
    pub fn apply(self, profile: &mut Profile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(photo_url) = self.photo_url {
            profile.photo_url = Some(photo_url);
        }
        if let Some(bio) = self.bio {
            profile.bio = Some(bio);
        }
        if let Some(dob) = self.dob {
            profile.dob = Some(dob);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_canonical_names_case_insensitively() {
        assert_eq!("Student".parse::<Role>().unwrap(), Role::Student);
        assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
        assert_eq!("MASS".parse::<Role>().unwrap(), Role::Mass);
        assert_eq!(" individual ".parse::<Role>().unwrap(), Role::Individual);
    }

    #[test]
    fn role_rejects_legacy_tutor_spelling() {
        assert!("tutor".parse::<Role>().is_err());
        assert!(serde_json::from_str::<Role>("\"tutor\"").is_err());
    }

    #[test]
    fn role_serializes_canonically() {
        assert_eq!(serde_json::to_string(&Role::Individual).unwrap(), "\"Individual\"");
        let parsed: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, Role::Admin);
    }

    #[test]
    fn login_role_matching() {
        assert!(Role::Student.matches_login(LoginRole::Student));
        assert!(!Role::Student.matches_login(LoginRole::Tutor));
        assert!(Role::Individual.matches_login(LoginRole::Tutor));
        assert!(Role::Mass.matches_login(LoginRole::Tutor));
        assert!(!Role::Admin.matches_login(LoginRole::Student));
        assert!(!Role::Admin.matches_login(LoginRole::Tutor));
    }

    #[test]
    fn stored_profile_normalizes_email_and_hides_it_from_profile() {
        let stored = StoredProfile::new(
            Profile {
                uid: "u1".to_string(),
                name: "Alex".to_string(),
                role: Role::Student,
                photo_url: None,
                bio: None,
                dob: NaiveDate::from_ymd_opt(2001, 4, 2),
            },
            " Alex@Example.com ",
            "2026-01-01T00:00:00Z".to_string(),
        );
        assert_eq!(stored.email, "alex@example.com");

        let json = serde_json::to_value(stored.profile()).unwrap();
        assert_eq!(json["uid"], "u1");
        assert_eq!(json["role"], "Student");
        assert_eq!(json["dob"], "2001-04-02");
        assert!(json.get("email").is_none());
    }

    #[test]
    fn update_never_touches_role() {
        let mut profile = Profile {
            uid: "u1".to_string(),
            name: "Old".to_string(),
            role: Role::Mass,
            photo_url: None,
            bio: Some("bio".to_string()),
            dob: None,
        };
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"name":"New","role":"Student"}"#).unwrap();
        update.apply(&mut profile);

        assert_eq!(profile.name, "New");
        assert_eq!(profile.role, Role::Mass);
        assert_eq!(profile.bio.as_deref(), Some("bio"));
    }
}
