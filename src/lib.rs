// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Steam Observer: backend API for tracking Steam market items
//!
//! Users sign in with Google. This crate runs the OAuth authorization-code
//! flow, keeps a local user record per Google account and issues its own
//! session tokens for the protected API.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{
    DashboardService, LoginOrchestrator, MarketService, SessionTokenIssuer, UserDirectory,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub login: LoginOrchestrator,
    pub sessions: Arc<dyn SessionTokenIssuer>,
    pub users: Arc<dyn UserDirectory>,
    pub dashboard: DashboardService,
    pub market: MarketService,
}
