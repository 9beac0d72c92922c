// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is read first, if present.

use std::env;
use std::time::Duration;

/// Shortest accepted `JWT_SECRET`, in bytes (HS256 key size).
pub const MIN_JWT_SECRET_LEN: usize = 32;

const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_JWT_ISSUER: &str = "steam-observer";
const DEFAULT_JWT_TTL_SECONDS: u64 = 3600;
/// Longest accepted `JWT_TTL_SECONDS` (30 days).
pub const MAX_JWT_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

/// How the session token reaches the browser after the OAuth callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenDelivery {
    /// 302 to the frontend with `?token=...`
    Redirect,
    /// 200 with `{"access_token": "..."}`
    Json,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Flattened JSON lines for Cloud Logging
    Json,
    /// Human-readable output for local development
    Pretty,
}

impl LogFormat {
    /// Read `LOG_FORMAT`. Needed before the rest of the config so that
    /// config errors are logged in the right format.
    pub fn from_env() -> Self {
        match env::var("LOG_FORMAT").as_deref() {
            Ok("pretty") => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Google OAuth ---
    pub google_client_id: String,
    pub google_client_secret: String,
    /// Callback URL registered with Google (points at `/auth/callback`)
    pub google_redirect_url: String,

    // --- Session tokens ---
    /// HS256 signing key (raw bytes, at least 32)
    pub jwt_signing_key: Vec<u8>,
    pub jwt_ttl: Duration,
    pub jwt_issuer: String,

    // --- HTTP ---
    /// Frontend URL for post-login redirects
    pub frontend_url: String,
    /// Extra origins allowed by CORS (the frontend URL is always allowed)
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub token_delivery: TokenDelivery,

    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = required("JWT_SECRET")?.into_bytes();
        if jwt_signing_key.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                reason: format!("must be at least {} bytes", MIN_JWT_SECRET_LEN),
            });
        }

        let jwt_ttl_seconds = match env::var("JWT_TTL_SECONDS") {
            Ok(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&s| s > 0 && s <= MAX_JWT_TTL_SECONDS)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "JWT_TTL_SECONDS",
                    reason: format!(
                        "not an integer between 1 and {}: {:?}",
                        MAX_JWT_TTL_SECONDS, v
                    ),
                })?,
            Err(_) => DEFAULT_JWT_TTL_SECONDS,
        };

        let token_delivery = match env::var("TOKEN_DELIVERY").as_deref() {
            Err(_) | Ok("redirect") => TokenDelivery::Redirect,
            Ok("json") => TokenDelivery::Json,
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    name: "TOKEN_DELIVERY",
                    reason: format!("expected \"redirect\" or \"json\", got {:?}", other),
                })
            }
        };

        Ok(Self {
            google_client_id: required("GOOGLE_CLIENT_ID")?,
            google_client_secret: required("GOOGLE_CLIENT_SECRET")?,
            google_redirect_url: required("GOOGLE_REDIRECT_URL")?,
            jwt_signing_key,
            jwt_ttl: Duration::from_secs(jwt_ttl_seconds),
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_JWT_ISSUER.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            token_delivery,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
        })
    }

    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            google_client_id: "test_client_id".to_string(),
            google_client_secret: "test_client_secret".to_string(),
            google_redirect_url: "http://localhost:8080/auth/callback".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            jwt_ttl: Duration::from_secs(DEFAULT_JWT_TTL_SECONDS),
            jwt_issuer: DEFAULT_JWT_ISSUER.to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            port: 8080,
            token_delivery: TokenDelivery::Redirect,
            gcp_project_id: "test-project".to_string(),
        }
    }

    /// Whether a browser origin may call the API.
    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        origin == self.frontend_url || self.cors_origins.iter().any(|o| o == origin)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
