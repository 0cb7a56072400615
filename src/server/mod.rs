//! HTTP surface for the advisor (axum).

pub mod errors;
pub mod handlers;

pub use errors::ApiError;

use crate::agent::Advisor;
use crate::state::Database;
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub advisor: Advisor,
    pub db: Arc<Mutex<Database>>,
    /// Cancelled on shutdown; in-flight advice requests get a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(advisor: Advisor, db: Arc<Mutex<Database>>) -> Self {
        Self {
            advisor,
            db,
            shutdown: CancellationToken::new(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/career-advice", post(handlers::career_advice_handler))
        .route("/api/stats", get(handlers::stats_handler))
        .route("/api/history", get(handlers::history_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until Ctrl-C or until `state.shutdown` is cancelled.
pub async fn serve(bind_address: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Listening on {}", listener.local_addr()?);

    let shutdown = state.shutdown.clone();
    let app = build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("Received Ctrl-C, shutting down"),
                _ = shutdown.cancelled() => {}
            }
            shutdown.cancel();
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}
