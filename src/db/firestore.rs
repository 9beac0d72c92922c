// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Users are stored in the `users` collection with the URL-encoded provider
//! subject ID as document ID. That makes the subject unique at the storage
//! layer: creation is an insert that fails if the document exists, and
//! updates carry an exists precondition so they never resurrect a user.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::services::{DirectoryError, UserDirectory};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::FirestoreWritePrecondition;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
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
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, DirectoryError> {
        self.client.as_ref().ok_or_else(|| {
            DirectoryError::Storage("Database not connected (offline mode)".to_string())
        })
    }
}

/// Document ID for a provider subject. Subjects are opaque provider strings
/// and may contain `/`, which Firestore treats as a path separator.
fn user_doc_id(provider_subject_id: &str) -> String {
    urlencoding::encode(provider_subject_id).into_owned()
}

fn storage_error(e: FirestoreError) -> DirectoryError {
    DirectoryError::Storage(e.to_string())
}

// ─── User Operations ─────────────────────────────────────────

#[async_trait]
impl UserDirectory for FirestoreDb {
    async fn find_by_provider_subject(
        &self,
        subject_id: &str,
    ) -> Result<Option<User>, DirectoryError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_doc_id(subject_id))
            .await
            .map_err(storage_error)
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, DirectoryError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("id").eq(user_id)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(storage_error)?;

        Ok(users.into_iter().next())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DirectoryError> {
        let user = new_user.into_user(chrono::Utc::now());
        let doc_id = user_doc_id(&user.provider_subject_id);

        self.get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&doc_id)
            .object(&user)
            .execute::<User>()
            .await
            .map_err(|e| match e {
                FirestoreError::DataConflictError(_) => {
                    DirectoryError::Conflict(user.provider_subject_id.clone())
                }
                other => storage_error(other),
            })
    }

    async fn update(&self, user: &User) -> Result<User, DirectoryError> {
        let mut stored = user.clone();
        stored.touch(chrono::Utc::now());

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(user_doc_id(&stored.provider_subject_id))
            .object(&stored)
            .execute::<User>()
            .await
            .map_err(|e| match e {
                FirestoreError::DataNotFoundError(_) => DirectoryError::NotFound,
                other => storage_error(other),
            })
    }
}
