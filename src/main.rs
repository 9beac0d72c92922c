// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Steam Observer API Server
//!
//! Signs users in with Google and serves the dashboard and market API.

use std::sync::Arc;
use steam_observer::{
    config::{Config, LogFormat},
    db::FirestoreDb,
    services::{
        state_store::SWEEP_INTERVAL, DashboardService, GoogleOAuthClient, InMemoryStateStore,
        JwtSessionIssuer, LoginOrchestrator, LoginSettings, MarketService, SessionTokenIssuer,
        UserDirectory,
    },
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogFormat::from_env())?;

    // Load configuration from environment
    let config = Config::from_env().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;
    tracing::info!(port = config.port, "Starting Steam Observer API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id).await?;
    let users: Arc<dyn UserDirectory> = Arc::new(db);

    // Pending logins live in process memory; the sweeper drops abandoned ones
    let states = Arc::new(InMemoryStateStore::new());
    let sweeper = states.spawn_sweeper(SWEEP_INTERVAL);

    let provider = Arc::new(GoogleOAuthClient::new(&config)?);
    let sessions: Arc<dyn SessionTokenIssuer> = Arc::new(JwtSessionIssuer::from_config(&config));

    let login = LoginOrchestrator::new(
        states,
        provider,
        users.clone(),
        sessions.clone(),
        LoginSettings::from_config(&config),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        login,
        sessions,
        users,
        dashboard: DashboardService::new(),
        market: MarketService::new(),
    });

    // Build router
    let app = steam_observer::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Initialize structured logging.
///
/// JSON (GCP-compliant) by default; `LOG_FORMAT=pretty` for local development.
fn init_logging(format: LogFormat) -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("steam_observer=debug".parse()?)
        .add_directive("info".parse()?);

    let (json, pretty) = match format {
        LogFormat::Json => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true),
            ),
            None,
        ),
        LogFormat::Pretty => (None, Some(tracing_subscriber::fmt::layer().pretty())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM (Cloud Run sends SIGTERM before stopping
/// an instance).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Graceful shutdown initiated");
}
