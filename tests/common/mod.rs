// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use steam_observer::config::Config;
use steam_observer::db::FirestoreDb;
use steam_observer::models::{NewUser, ProviderIdentity, ProviderTokens, User};
use steam_observer::routes::create_router;
use steam_observer::services::{
    DashboardService, DirectoryError, IdentityProvider, InMemoryStateStore, JwtSessionIssuer,
    LoginOrchestrator, LoginSettings, MarketService, ProviderError, SessionClaims,
    SessionTokenError, SessionTokenIssuer, StateStore, StateStoreError, UserDirectory,
};
use steam_observer::AppState;

/// Check if emulator is available via environment variable.
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

// ─── Identity provider double ────────────────────────────────

/// Identity provider that answers from memory and counts its calls.
pub struct StubIdentityProvider {
    identity: Mutex<ProviderIdentity>,
    pub exchange_calls: AtomicUsize,
    pub resolve_calls: AtomicUsize,
    pub fail_exchange: AtomicBool,
    pub fail_resolve: AtomicBool,
    last_code: Mutex<Option<String>>,
}

impl StubIdentityProvider {
    pub fn new(identity: ProviderIdentity) -> Self {
        Self {
            identity: Mutex::new(identity),
            exchange_calls: AtomicUsize::new(0),
            resolve_calls: AtomicUsize::new(0),
            fail_exchange: AtomicBool::new(false),
            fail_resolve: AtomicBool::new(false),
            last_code: Mutex::new(None),
        }
    }

    pub fn set_identity(&self, identity: ProviderIdentity) {
        *self.identity.lock().unwrap() = identity;
    }

    pub fn calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst) + self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn last_code(&self) -> Option<String> {
        self.last_code.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, ProviderError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_code.lock().unwrap() = Some(code.to_string());

        if self.fail_exchange.load(Ordering::SeqCst) {
            return Err(ProviderError::ExchangeFailed("invalid_grant".to_string()));
        }
        Ok(ProviderTokens {
            access_token: format!("access-for-{}", code),
            refresh_token: None,
            id_token: None,
            expires_in: Some(3599),
        })
    }

    async fn resolve_identity(
        &self,
        access_token: &str,
    ) -> Result<ProviderIdentity, ProviderError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        assert!(access_token.starts_with("access-for-"));

        if self.fail_resolve.load(Ordering::SeqCst) {
            return Err(ProviderError::MissingSubject);
        }
        Ok(self.identity.lock().unwrap().clone())
    }
}

// ─── User directory double ───────────────────────────────────

/// In-memory user directory keyed by provider subject ID.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<String, User>>,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub fail_lookup: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
    /// Artificial latency for every call
    pub delay: Mutex<Option<Duration>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn get(&self, subject_id: &str) -> Option<User> {
        self.users.lock().unwrap().get(subject_id).cloned()
    }

    pub fn insert(&self, user: User) {
        self.users
            .lock()
            .unwrap()
            .insert(user.provider_subject_id.clone(), user);
    }

    async fn maybe_delay(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_provider_subject(
        &self,
        subject_id: &str,
    ) -> Result<Option<User>, DirectoryError> {
        self.maybe_delay().await;
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(DirectoryError::Storage("lookup unavailable".to_string()));
        }
        Ok(self.get(subject_id))
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, DirectoryError> {
        self.maybe_delay().await;
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.id == user_id)
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DirectoryError> {
        self.maybe_delay().await;
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(DirectoryError::Storage("create unavailable".to_string()));
        }

        let mut users = self.users.lock().unwrap();
        if users.contains_key(&new_user.provider_subject_id) {
            return Err(DirectoryError::Conflict(new_user.provider_subject_id));
        }
        let user = new_user.into_user(chrono::Utc::now());
        users.insert(user.provider_subject_id.clone(), user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DirectoryError> {
        self.maybe_delay().await;
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(DirectoryError::Storage("update unavailable".to_string()));
        }

        let mut users = self.users.lock().unwrap();
        let stored = users
            .get_mut(&user.provider_subject_id)
            .ok_or(DirectoryError::NotFound)?;
        stored.email = user.email.clone();
        stored.touch(chrono::Utc::now());
        Ok(stored.clone())
    }
}

// ─── State store double ──────────────────────────────────────

/// State store whose backend is always down.
pub struct FailingStateStore;

#[async_trait]
impl StateStore for FailingStateStore {
    async fn save(
        &self,
        _state: &str,
        _redirect_target: &str,
        _ttl: Duration,
    ) -> Result<(), StateStoreError> {
        Err(StateStoreError::Storage("backend unavailable".to_string()))
    }

    async fn consume(&self, _state: &str) -> Result<String, StateStoreError> {
        Err(StateStoreError::Storage("backend unavailable".to_string()))
    }
}

// ─── Session issuer double ───────────────────────────────────

/// Session issuer whose signing key is unusable.
pub struct FailingSessionIssuer;

impl SessionTokenIssuer for FailingSessionIssuer {
    fn issue(&self, _user_id: &str, _email: Option<&str>) -> Result<String, SessionTokenError> {
        Err(SessionTokenError::Issuance("signing unavailable".to_string()))
    }

    fn parse(&self, _token: &str) -> Result<SessionClaims, SessionTokenError> {
        Err(SessionTokenError::InvalidToken)
    }
}

// ─── Test context ────────────────────────────────────────────

pub fn identity(subject_id: &str, email: Option<&str>) -> ProviderIdentity {
    ProviderIdentity {
        subject_id: subject_id.to_string(),
        email: email.map(str::to_string),
        email_verified: true,
    }
}

/// Collaborators wired together the way `main` does, with doubles for
/// everything that leaves the process.
pub struct TestContext {
    pub config: Config,
    pub states: Arc<InMemoryStateStore>,
    pub provider: Arc<StubIdentityProvider>,
    pub users: Arc<InMemoryUserDirectory>,
    pub sessions: Arc<JwtSessionIssuer>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::test_default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            states: Arc::new(InMemoryStateStore::new()),
            provider: Arc::new(StubIdentityProvider::new(identity("g-1", Some("a@x.com")))),
            users: Arc::new(InMemoryUserDirectory::new()),
            sessions: Arc::new(JwtSessionIssuer::from_config(&config)),
            config,
        }
    }

    pub fn settings(&self) -> LoginSettings {
        LoginSettings::from_config(&self.config)
    }

    pub fn orchestrator(&self) -> LoginOrchestrator {
        self.orchestrator_with(self.states.clone(), self.settings())
    }

    pub fn orchestrator_with(
        &self,
        states: Arc<dyn StateStore>,
        settings: LoginSettings,
    ) -> LoginOrchestrator {
        self.orchestrator_with_sessions(states, self.sessions.clone(), settings)
    }

    pub fn orchestrator_with_sessions(
        &self,
        states: Arc<dyn StateStore>,
        sessions: Arc<dyn SessionTokenIssuer>,
        settings: LoginSettings,
    ) -> LoginOrchestrator {
        LoginOrchestrator::new(
            states,
            self.provider.clone(),
            self.users.clone(),
            sessions,
            settings,
        )
    }

    /// Router and state backed by this context's doubles.
    pub fn app(&self) -> (axum::Router, Arc<AppState>) {
        self.app_with_login(self.orchestrator())
    }

    pub fn app_with_login(&self, login: LoginOrchestrator) -> (axum::Router, Arc<AppState>) {
        let sessions: Arc<dyn SessionTokenIssuer> = self.sessions.clone();
        let users: Arc<dyn UserDirectory> = self.users.clone();

        let state = Arc::new(AppState {
            config: self.config.clone(),
            login,
            sessions,
            users,
            dashboard: DashboardService::new(),
            market: MarketService::new(),
        });

        (create_router(state.clone()), state)
    }
}

/// Create a test app with in-memory dependencies.
/// Returns the router and the shared state.
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    TestContext::new().app()
}

/// Pull the `state` query parameter out of an authorization URL.
pub fn state_param(auth_url: &str) -> String {
    reqwest::Url::parse(auth_url)
        .expect("authorization URL should parse")
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("authorization URL should carry a state")
}
