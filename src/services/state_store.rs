// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Short-lived storage for pending OAuth logins.
//!
//! Each login attempt stores its random `state` value together with the
//! post-login redirect target. The callback consumes the entry, which
//! removes it, so a state value can be redeemed at most once.
//!
//! The in-memory store only works within a single process. A deployment with
//! several instances needs a shared key-value backend behind [`StateStore`].

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How often the background sweeper drops abandoned logins.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// State store failures.
#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    #[error("state not found")]
    NotFound,

    #[error("state expired")]
    Expired,

    #[error("state storage error: {0}")]
    Storage(String),
}

/// Storage for single-use login state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Store `state` with the redirect target, valid for `ttl`.
    async fn save(
        &self,
        state: &str,
        redirect_target: &str,
        ttl: Duration,
    ) -> Result<(), StateStoreError>;

    /// Remove `state` and return its redirect target.
    ///
    /// Fails with `NotFound` if the state was never saved or has already been
    /// consumed, and with `Expired` if it outlived its TTL. Expired entries are
    /// removed as well.
    async fn consume(&self, state: &str) -> Result<String, StateStoreError>;
}

/// A login that has started but not yet come back from the provider.
#[derive(Debug, Clone)]
struct PendingLogin {
    redirect_target: String,
    expires_at: Instant,
}

/// Process-local state store backed by a `DashMap`.
///
/// `save`, `consume` and the sweep all take the shard lock for the key they
/// touch, so concurrent consumers of one state see exactly one success.
#[derive(Default)]
pub struct InMemoryStateStore {
    entries: DashMap<String, PendingLogin>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            let keep = now <= entry.expires_at;
            if !keep {
                removed += 1;
            }
            keep
        });

        removed
    }

    /// Start the periodic sweeper.
    ///
    /// The task only holds a weak reference, so it also ends once the store
    /// itself is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> StateSweeper {
        let store: Weak<Self> = Arc::downgrade(self);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let Some(store) = store.upgrade() else {
                            break;
                        };
                        let removed = store.sweep_expired();
                        if removed > 0 {
                            tracing::debug!(removed, remaining = store.len(), "Swept expired login states");
                        }
                    }
                }
            }

            tracing::debug!("State sweeper stopped");
        });

        StateSweeper {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn save(
        &self,
        state: &str,
        redirect_target: &str,
        ttl: Duration,
    ) -> Result<(), StateStoreError> {
        self.entries.insert(
            state.to_string(),
            PendingLogin {
                redirect_target: redirect_target.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn consume(&self, state: &str) -> Result<String, StateStoreError> {
        let (_, entry) = self
            .entries
            .remove(state)
            .ok_or(StateStoreError::NotFound)?;

        if Instant::now() > entry.expires_at {
            return Err(StateStoreError::Expired);
        }

        Ok(entry.redirect_target)
    }
}

/// Handle to the background sweeper task.
///
/// Dropping the handle aborts the task; `shutdown` stops it and waits.
pub struct StateSweeper {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl StateSweeper {
    /// Signal the sweeper to stop and wait for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            // The task may already have exited if the store was dropped.
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "State sweeper ended abnormally");
            }
        }
    }
}

impl Drop for StateSweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
