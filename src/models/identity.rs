// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity data returned by the OAuth provider.

use crate::models::user::NewUser;

/// Tokens returned by the provider's token endpoint.
#[derive(Debug, Clone)]
pub struct ProviderTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// Verified identity of the end user, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    /// Stable provider-scoped ID (OpenID `sub`), never empty
    pub subject_id: String,
    pub email: Option<String>,
    pub email_verified: bool,
}

impl ProviderIdentity {
    /// The email address, if the provider vouched for it.
    ///
    /// Unverified or empty addresses are treated as absent.
    pub fn trusted_email(&self) -> Option<&str> {
        match self.email.as_deref() {
            Some(email) if self.email_verified && !email.is_empty() => Some(email),
            _ => None,
        }
    }

    /// Local account fields for a first-time login.
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            provider_subject_id: self.subject_id.clone(),
            email: self.trusted_email().map(str::to_string),
        }
    }
}
