// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile storage with typed operations.
//!
//! Backed by Firestore in production. The in-memory backend serves local
//! development and the offline test app; it implements the same
//! create/read/update semantics (including the duplicate-create conflict).

use crate::db::collections;
use crate::error::AppError;
use crate::models::{ProfileUpdate, StoredProfile};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<DashMap<String, StoredProfile>>),
}

/// Profile database client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a process-local store (no persistence).
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(DashMap::new())),
        }
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a profile by identity uid.
    pub async fn get_profile(&self, uid: &str) -> Result<Option<StoredProfile>, AppError> {
        match &self.backend {
            Backend::Memory(map) => Ok(map.get(uid).map(|p| p.value().clone())),
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(uid)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
        }
    }

    /// Find a profile by (case-insensitive) email.
    pub async fn find_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredProfile>, AppError> {
        let email = email.trim().to_ascii_lowercase();

        match &self.backend {
            Backend::Memory(map) => Ok(map
                .iter()
                .find(|entry| entry.value().email == email)
                .map(|entry| entry.value().clone())),
            Backend::Firestore(client) => {
                let matches: Vec<StoredProfile> = client
                    .fluent()
                    .select()
                    .from(collections::USERS)
                    .filter(move |q| q.field("email").eq(email.clone()))
                    .limit(1)
                    .obj()
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(matches.into_iter().next())
            }
        }
    }

    /// Create a profile. Fails with [`AppError::Conflict`] if the uid exists.
    pub async fn create_profile(&self, profile: &StoredProfile) -> Result<(), AppError> {
        match &self.backend {
            Backend::Memory(map) => match map.entry(profile.uid.clone()) {
                Entry::Occupied(_) => Err(conflict(&profile.uid)),
                Entry::Vacant(slot) => {
                    slot.insert(profile.clone());
                    Ok(())
                }
            },
            Backend::Firestore(client) => {
                let result: Result<StoredProfile, _> = client
                    .fluent()
                    .insert()
                    .into(collections::USERS)
                    .document_id(&profile.uid)
                    .object(profile)
                    .execute()
                    .await;

                match result {
                    Ok(_) => Ok(()),
                    Err(firestore::errors::FirestoreError::DataConflictError(_)) => {
                        Err(conflict(&profile.uid))
                    }
                    Err(e) => Err(AppError::Database(e.to_string())),
                }
            }
        }
    }

    /// Apply an update to an existing profile and return the result.
    ///
    /// Returns `Ok(None)` if no profile exists for `uid`.
    pub async fn update_profile(
        &self,
        uid: &str,
        update: ProfileUpdate,
    ) -> Result<Option<StoredProfile>, AppError> {
        match &self.backend {
            Backend::Memory(map) => Ok(map.get_mut(uid).map(|mut entry| {
                entry.apply(update);
                entry.clone()
            })),
            Backend::Firestore(client) => {
                let mut transaction = client.begin_transaction().await.map_err(|e| {
                    AppError::Database(format!("Failed to begin transaction: {}", e))
                })?;

                // Read through the transaction so a concurrent write aborts the commit.
                let reader = client.clone_with_consistency_selector(
                    firestore::FirestoreConsistencySelector::Transaction(
                        transaction.transaction_id().clone(),
                    ),
                );
                let current: Option<StoredProfile> = reader
                    .fluent()
                    .select()
                    .by_id_in(collections::USERS)
                    .obj()
                    .one(uid)
                    .await
                    .map_err(|e| {
                        AppError::Database(format!("Failed to read profile in transaction: {}", e))
                    })?;

                let Some(mut stored) = current else {
                    if let Err(e) = transaction.rollback().await {
                        tracing::warn!(uid, error = %e, "Failed to roll back profile update");
                    }
                    return Ok(None);
                };
                stored.apply(update);

                client
                    .fluent()
                    .update()
                    .in_col(collections::USERS)
                    .document_id(uid)
                    .object(&stored)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!("Failed to add profile to transaction: {}", e))
                    })?;

                transaction
                    .commit()
                    .await
                    .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

                Ok(Some(stored))
            }
        }
    }
}

fn conflict(uid: &str) -> AppError {
    AppError::Conflict(format!("Profile for {} already exists", uid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Profile, Role};

    fn stored(uid: &str, email: &str, role: Role) -> StoredProfile {
        StoredProfile::new(
            Profile {
                uid: uid.to_string(),
                name: "Test".to_string(),
                role,
                photo_url: None,
                bio: None,
                dob: None,
            },
            email,
            "2026-01-01T00:00:00Z".to_string(),
        )
    }

    #[tokio::test]
    async fn memory_create_then_get() {
        let db = FirestoreDb::new_in_memory();
        db.create_profile(&stored("u1", "a@example.com", Role::Student))
            .await
            .unwrap();

        let found = db.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(found.role, Role::Student);
        assert!(db.get_profile("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_duplicate_create_conflicts() {
        let db = FirestoreDb::new_in_memory();
        let profile = stored("u1", "a@example.com", Role::Student);
        db.create_profile(&profile).await.unwrap();

        let err = db.create_profile(&profile).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn memory_find_by_email_ignores_case() {
        let db = FirestoreDb::new_in_memory();
        db.create_profile(&stored("u1", "Tutor@Example.com", Role::Mass))
            .await
            .unwrap();

        let found = db
            .find_profile_by_email("TUTOR@example.COM")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.uid, "u1");
        assert!(db
            .find_profile_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn memory_update_missing_returns_none() {
        let db = FirestoreDb::new_in_memory();
        let result = db
            .update_profile("ghost", ProfileUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
