//! User model for storage and API.

use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Local user account stored in Firestore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Locally generated ID (UUID v4), independent of the provider
    pub id: String,
    /// Email address (None if the provider withheld it or it is unverified)
    pub email: Option<String>,
    /// Provider subject ID this account is bound to (unique)
    pub provider_subject_id: String,
    /// When the account was created (RFC 3339)
    pub created_at: String,
    /// Last mutation (RFC 3339)
    pub updated_at: String,
}

/// Fields supplied by the caller when creating a user.
///
/// The directory assigns `id`, `created_at` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub provider_subject_id: String,
    pub email: Option<String>,
}

impl NewUser {
    /// Build the stored record with a fresh ID and timestamps.
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        let now = format_utc_rfc3339(now);
        User {
            id: uuid::Uuid::new_v4().to_string(),
            email: self.email,
            provider_subject_id: self.provider_subject_id,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl User {
    /// Advance `updated_at` to `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = format_utc_rfc3339(now);
    }
}
