// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod dashboard;
pub mod google_oauth;
pub mod login;
pub mod market;
pub mod secure_token;
pub mod session_token;
pub mod state_store;
pub mod user_directory;

pub use dashboard::DashboardService;
pub use google_oauth::{GoogleOAuthClient, IdentityProvider, ProviderError};
pub use login::{LoginError, LoginOrchestrator, LoginOutcome, LoginSettings, LoginStage};
pub use market::MarketService;
pub use secure_token::{generate_state_token, EntropySourceUnavailable};
pub use session_token::{JwtSessionIssuer, SessionClaims, SessionTokenError, SessionTokenIssuer};
pub use state_store::{InMemoryStateStore, StateStore, StateStoreError, StateSweeper};
pub use user_directory::{DirectoryError, UserDirectory};
