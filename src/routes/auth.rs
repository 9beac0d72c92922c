// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth login routes.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::config::TokenDelivery;
use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", get(login))
        .route("/auth/callback", get(callback))
}

/// Query parameters for starting the OAuth flow.
#[derive(Deserialize, Validate)]
pub struct LoginParams {
    /// Frontend path to land on after login, e.g. `/dashboard`.
    #[validate(length(max = 2048))]
    #[serde(default)]
    redirect: Option<String>,
}

/// Start OAuth flow - redirect to Google authorization.
async fn login(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LoginParams>,
) -> Result<Response> {
    params
        .validate()
        .map_err(|_| AppError::BadRequest("redirect too long".to_string()))?;

    let auth_url = state
        .login
        .begin_login(params.redirect.as_deref())
        .await
        .map_err(AppError::LoginStart)?;

    Ok(found(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    /// Set by Google when the user denies consent
    #[serde(default)]
    error: Option<String>,
}

/// Token returned when `TOKEN_DELIVERY=json`.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TokenResponse {
    pub access_token: String,
}

/// OAuth callback - validate state, exchange code, issue a session token.
async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    if let Some(error) = &params.error {
        tracing::warn!(error = %error, "Google returned an OAuth error");
    }

    let code = non_empty(params.code).ok_or_else(|| AppError::BadRequest("missing code".into()))?;
    let oauth_state =
        non_empty(params.state).ok_or_else(|| AppError::BadRequest("missing state".into()))?;

    let outcome = state
        .login
        .complete_login(&code, &oauth_state)
        .await
        .map_err(AppError::LoginCallback)?;

    match state.config.token_delivery {
        TokenDelivery::Json => Ok(Json(TokenResponse {
            access_token: outcome.session_token,
        })
        .into_response()),
        TokenDelivery::Redirect => {
            let landing = landing_url(
                &state.config.frontend_url,
                &outcome.redirect_target,
                &outcome.session_token,
            )?;
            tracing::info!(user_id = %outcome.user_id, "Redirecting to frontend after login");
            Ok(found(&landing))
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// 302 Found with a `Location` header.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Frontend URL for `redirect_target` with the session token appended as
/// the `token` query parameter.
///
/// `redirect_target` is either empty or a same-site path (checked when the
/// login started). Any `token` parameter already in the target is dropped so
/// the issued token is the only one the frontend sees.
pub fn landing_url(frontend_url: &str, redirect_target: &str, token: &str) -> Result<String> {
    let path = if redirect_target.is_empty() {
        "/"
    } else {
        redirect_target
    };

    let mut url = Url::parse(&format!("{}{}", frontend_url.trim_end_matches('/'), path))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid frontend URL: {}", e)))?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name != "token")
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(&kept)
        .append_pair("token", token);

    Ok(url.into())
}
