// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth client.
//!
//! Handles the two server-side calls of the authorization-code flow:
//! - Exchanging the authorization code for Google tokens
//! - Fetching the OpenID userinfo record for the access token

use crate::config::Config;
use crate::models::{ProviderIdentity, ProviderTokens};
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity provider failures.
///
/// The message carries the underlying cause for logs only; callers branch on
/// the variant.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("identity resolution failed: {0}")]
    ResolutionFailed(String),

    #[error("identity response is missing the subject identifier")]
    MissingSubject,
}

/// External OAuth identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Trade a single-use authorization code for provider tokens.
    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, ProviderError>;

    /// Look up who the access token belongs to.
    async fn resolve_identity(&self, access_token: &str)
        -> Result<ProviderIdentity, ProviderError>;
}

/// Google implementation of [`IdentityProvider`].
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_url: String,
    userinfo_url: String,
}

impl GoogleOAuthClient {
    /// Create a client for Google's production endpoints.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building Google OAuth HTTP client")?;

        Ok(Self {
            http,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.google_redirect_url.clone(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        })
    }

    /// Point the client at different token/userinfo endpoints.
    ///
    /// Used for tests against a local mock server.
    pub fn with_endpoints(
        mut self,
        token_url: impl Into<String>,
        userinfo_url: impl Into<String>,
    ) -> Self {
        self.token_url = token_url.into();
        self.userinfo_url = userinfo_url.into();
        self
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuthClient {
    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, ProviderError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::ExchangeFailed(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token exchange failed");
            return Err(ProviderError::ExchangeFailed(format!(
                "token endpoint returned status {}",
                status
            )));
        }

        let token: GoogleTokenResponse = response.json().await.map_err(|e| {
            ProviderError::ExchangeFailed(format!("failed to parse token response: {}", e))
        })?;

        if token.access_token.is_empty() {
            return Err(ProviderError::ExchangeFailed(
                "token response has an empty access_token".to_string(),
            ));
        }

        Ok(ProviderTokens {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            id_token: token.id_token,
            expires_in: token.expires_in,
        })
    }

    async fn resolve_identity(
        &self,
        access_token: &str,
    ) -> Result<ProviderIdentity, ProviderError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::ResolutionFailed(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google userinfo request failed");
            return Err(ProviderError::ResolutionFailed(format!(
                "userinfo endpoint returned status {}",
                status
            )));
        }

        let info: GoogleUserInfo = response.json().await.map_err(|e| {
            ProviderError::ResolutionFailed(format!("failed to parse userinfo: {}", e))
        })?;

        info.into_identity()
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// OpenID Connect userinfo response.
///
/// Only the fields we keep are listed; name/picture/locale are ignored.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
}

impl GoogleUserInfo {
    fn into_identity(self) -> Result<ProviderIdentity, ProviderError> {
        let subject_id = match self.sub {
            Some(sub) if !sub.trim().is_empty() => sub,
            _ => return Err(ProviderError::MissingSubject),
        };

        Ok(ProviderIdentity {
            subject_id,
            email: self.email.filter(|e| !e.is_empty()),
            email_verified: self.email_verified.unwrap_or(false),
        })
    }
}
