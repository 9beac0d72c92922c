// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local user records keyed by the identity provider's subject ID.

use crate::models::{NewUser, User};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("user not found")]
    NotFound,

    /// A user with this provider subject ID already exists.
    #[error("user already exists: {0}")]
    Conflict(String),

    #[error("user storage error: {0}")]
    Storage(String),
}

/// Persistent store of local users.
///
/// Implementations must keep `provider_subject_id` unique: `create` for a
/// subject that already has a user fails with [`DirectoryError::Conflict`]
/// and never overwrites the existing record.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_provider_subject(
        &self,
        subject_id: &str,
    ) -> Result<Option<User>, DirectoryError>;

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, DirectoryError>;

    /// Store a new user, assigning its ID and timestamps.
    async fn create(&self, new_user: NewUser) -> Result<User, DirectoryError>;

    /// Persist the user's email and advance `updated_at`.
    ///
    /// Returns the stored record.
    async fn update(&self, user: &User) -> Result<User, DirectoryError>;
}
