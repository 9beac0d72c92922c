// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session tokens issued after a successful login.
//!
//! Tokens are HS256 JWTs signed with a secret held only by this service.
//! They are not stored anywhere; every protected request verifies the
//! signature, algorithm, issuer and validity window.

use crate::config::Config;
use crate::time_utils::unix_seconds;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The only algorithm accepted when parsing.
const SESSION_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (local user ID)
    pub sub: String,
    /// Email, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Not before (Unix timestamp)
    pub nbf: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issuer
    pub iss: String,
}

/// Identity recovered from a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: String,
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionTokenError {
    #[error("failed to sign session token: {0}")]
    Issuance(String),

    /// Deliberately carries no detail about which check failed.
    #[error("invalid token")]
    InvalidToken,
}

/// Mints and verifies session tokens.
pub trait SessionTokenIssuer: Send + Sync {
    fn issue(&self, user_id: &str, email: Option<&str>) -> Result<String, SessionTokenError>;

    fn parse(&self, token: &str) -> Result<SessionClaims, SessionTokenError>;
}

/// HS256 JWT implementation of [`SessionTokenIssuer`].
pub struct JwtSessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    issuer: String,
}

impl JwtSessionIssuer {
    pub fn new(signing_key: &[u8], ttl: Duration, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            ttl,
            issuer: issuer.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_signing_key, config.jwt_ttl, &config.jwt_issuer)
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        user_id: &str,
        email: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String, SessionTokenError> {
        let iat = unix_seconds(now);
        let exp = iat
            .checked_add(self.ttl.as_secs())
            .ok_or_else(|| SessionTokenError::Issuance("token lifetime overflows".to_string()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            iat,
            nbf: iat,
            exp,
            iss: self.issuer.clone(),
        };

        encode(&Header::new(SESSION_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| SessionTokenError::Issuance(e.to_string()))
    }

    /// Verify a token as if the current time were `now`.
    pub fn parse_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, SessionTokenError> {
        // Time checks are done below against `now` rather than the system clock.
        let mut validation = Validation::new(SESSION_ALGORITHM);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            SessionTokenError::InvalidToken
        })?;

        let claims = token_data.claims;
        let now = unix_seconds(now);

        if now >= claims.exp || now < claims.nbf {
            tracing::debug!(exp = claims.exp, nbf = claims.nbf, now, "Session token outside validity window");
            return Err(SessionTokenError::InvalidToken);
        }

        if claims.sub.is_empty() {
            return Err(SessionTokenError::InvalidToken);
        }

        Ok(SessionClaims {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

impl SessionTokenIssuer for JwtSessionIssuer {
    fn issue(&self, user_id: &str, email: Option<&str>) -> Result<String, SessionTokenError> {
        self.issue_at(user_id, email, Utc::now())
    }

    fn parse(&self, token: &str) -> Result<SessionClaims, SessionTokenError> {
        self.parse_at(token, Utc::now())
    }
}
