// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Two-phase OAuth login.
//!
//! [`LoginOrchestrator::begin_login`] records a random `state` value and
//! returns the provider's authorization URL. [`LoginOrchestrator::complete_login`]
//! runs on the callback: it redeems the state, exchanges the code, resolves
//! the user's identity, finds or creates the local user and issues a session
//! token. Every step short-circuits on failure and nothing is retried.

use crate::config::Config;
use crate::models::{ProviderIdentity, User};
use crate::services::google_oauth::{IdentityProvider, ProviderError};
use crate::services::secure_token::generate_state_token;
use crate::services::session_token::{SessionTokenError, SessionTokenIssuer};
use crate::services::state_store::{StateStore, StateStoreError};
use crate::services::user_directory::{DirectoryError, UserDirectory};
use reqwest::Url;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_SCOPES: &str = "openid email profile";
const DEFAULT_STATE_TTL: Duration = Duration::from_secs(10 * 60);
const DEFAULT_DIRECTORY_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECT_LEN: usize = 2048;

/// Progress of a single callback through the login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    Pending,
    StateValidated,
    CodeExchanged,
    IdentityResolved,
    UserResolved,
    TokenIssued,
}

/// Login failures, one per step.
///
/// The HTTP layer maps every callback failure to the same response, so the
/// variant and its source are only visible in logs.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("cannot start login")]
    InitiationFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("invalid or expired state")]
    InvalidOrExpiredState(#[source] StateStoreError),

    #[error("authorization code exchange failed")]
    CodeExchangeFailed(#[source] ProviderError),

    #[error("identity resolution failed")]
    IdentityResolutionFailed(#[source] ProviderError),

    #[error("user lookup failed")]
    UserLookupFailed(#[source] DirectoryError),

    #[error("user creation failed")]
    UserCreationFailed(#[source] DirectoryError),

    #[error("session token issuance failed")]
    TokenIssuanceFailed(#[source] SessionTokenError),
}

impl LoginError {
    /// Last stage the flow reached before this failure.
    pub fn failed_at(&self) -> LoginStage {
        match self {
            LoginError::InitiationFailed(_) | LoginError::InvalidOrExpiredState(_) => {
                LoginStage::Pending
            }
            LoginError::CodeExchangeFailed(_) => LoginStage::StateValidated,
            LoginError::IdentityResolutionFailed(_) => LoginStage::CodeExchanged,
            LoginError::UserLookupFailed(_) | LoginError::UserCreationFailed(_) => {
                LoginStage::IdentityResolved
            }
            LoginError::TokenIssuanceFailed(_) => LoginStage::UserResolved,
        }
    }
}

/// Result of a completed login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session_token: String,
    pub user_id: String,
    /// Safe same-site path recorded at login start, or empty.
    pub redirect_target: String,
}

/// Provider and timing parameters for the login flow.
#[derive(Debug, Clone)]
pub struct LoginSettings {
    pub client_id: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub scopes: String,
    pub state_ttl: Duration,
    /// Deadline for each user directory call.
    pub directory_timeout: Duration,
}

impl LoginSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client_id: config.google_client_id.clone(),
            redirect_uri: config.google_redirect_url.clone(),
            authorize_url: GOOGLE_AUTHORIZE_URL.to_string(),
            scopes: DEFAULT_SCOPES.to_string(),
            state_ttl: DEFAULT_STATE_TTL,
            directory_timeout: DEFAULT_DIRECTORY_TIMEOUT,
        }
    }
}

pub struct LoginOrchestrator {
    states: Arc<dyn StateStore>,
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserDirectory>,
    sessions: Arc<dyn SessionTokenIssuer>,
    settings: LoginSettings,
}

impl LoginOrchestrator {
    pub fn new(
        states: Arc<dyn StateStore>,
        provider: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserDirectory>,
        sessions: Arc<dyn SessionTokenIssuer>,
        settings: LoginSettings,
    ) -> Self {
        Self {
            states,
            provider,
            users,
            sessions,
            settings,
        }
    }

    pub fn settings(&self) -> &LoginSettings {
        &self.settings
    }

    /// Start a login and return the provider authorization URL.
    ///
    /// Unsafe redirect targets are dropped here, so only a same-site path
    /// is ever stored alongside the state.
    pub async fn begin_login(&self, redirect: Option<&str>) -> Result<String, LoginError> {
        let state =
            generate_state_token().map_err(|e| LoginError::InitiationFailed(Box::new(e)))?;
        let redirect_target = sanitize_redirect(redirect);

        self.states
            .save(&state, &redirect_target, self.settings.state_ttl)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to save login state");
                LoginError::InitiationFailed(Box::new(e))
            })?;

        let url = self.authorization_url(&state)?;

        tracing::debug!(redirect = %redirect_target, "Login started");
        Ok(url)
    }

    fn authorization_url(&self, state: &str) -> Result<String, LoginError> {
        let url = Url::parse_with_params(
            &self.settings.authorize_url,
            &[
                ("client_id", self.settings.client_id.as_str()),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", self.settings.scopes.as_str()),
                ("access_type", "offline"),
                ("state", state),
            ],
        )
        .map_err(|e| LoginError::InitiationFailed(Box::new(e)))?;
        Ok(url.into())
    }

    /// Finish a login from the provider callback.
    pub async fn complete_login(
        &self,
        code: &str,
        state: &str,
    ) -> Result<LoginOutcome, LoginError> {
        // The state check gates everything; no provider call happens before it.
        let redirect_target = self.states.consume(state).await.map_err(|e| {
            tracing::warn!(error = %e, "Rejected login callback state");
            LoginError::InvalidOrExpiredState(e)
        })?;

        let tokens = self
            .provider
            .exchange_code(code)
            .await
            .map_err(LoginError::CodeExchangeFailed)?;

        let identity = self
            .provider
            .resolve_identity(&tokens.access_token)
            .await
            .map_err(LoginError::IdentityResolutionFailed)?;

        let user = self.resolve_user(&identity).await?;

        let session_token = self
            .sessions
            .issue(&user.id, user.email.as_deref())
            .map_err(LoginError::TokenIssuanceFailed)?;

        tracing::info!(user_id = %user.id, "Login completed");

        Ok(LoginOutcome {
            session_token,
            user_id: user.id,
            redirect_target,
        })
    }

    /// Find or create the local user for `identity`, syncing the email.
    async fn resolve_user(&self, identity: &ProviderIdentity) -> Result<User, LoginError> {
        let existing = self
            .with_deadline(
                "find_by_provider_subject",
                self.users.find_by_provider_subject(&identity.subject_id),
            )
            .await
            .map_err(LoginError::UserLookupFailed)?;

        let Some(user) = existing else {
            let user = self
                .with_deadline("create", self.users.create(identity.to_new_user()))
                .await
                .map_err(LoginError::UserCreationFailed)?;
            tracing::info!(user_id = %user.id, "Created user on first login");
            return Ok(user);
        };

        let trusted_email = identity.trusted_email();
        if user.email.as_deref() == trusted_email {
            return Ok(user);
        }

        let mut changed = user.clone();
        changed.email = trusted_email.map(str::to_string);

        match self
            .with_deadline("update", self.users.update(&changed))
            .await
        {
            Ok(updated) => Ok(updated),
            Err(e) => {
                // The login still succeeds with the previously stored email.
                tracing::warn!(user_id = %user.id, error = %e, "Failed to update user email");
                Ok(user)
            }
        }
    }

    async fn with_deadline<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, DirectoryError>>,
    ) -> Result<T, DirectoryError> {
        tokio::time::timeout(self.settings.directory_timeout, call)
            .await
            .map_err(|_| DirectoryError::Storage(format!("{} timed out", operation)))?
    }
}

/// Keep `redirect` only if it is a same-site absolute path.
///
/// Anything else (absolute URLs, protocol-relative `//host`, backslashes,
/// control characters, oversized values) becomes the empty string, which
/// means "land on the frontend root".
pub fn sanitize_redirect(redirect: Option<&str>) -> String {
    match redirect {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control)
                && path.len() <= MAX_REDIRECT_LEN =>
        {
            path.to_string()
        }
        _ => String::new(),
    }
}
