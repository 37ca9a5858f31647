//! HTTP service for Commander Ledger
//!
//! Serves the deck, match, format and account endpoints in front of the
//! hosted backend, the read-only statistics endpoints, and the commander
//! color backfill job.

use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod api;
pub mod auth;
pub mod backfill;
pub mod config;
pub mod error;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

use config::ServerConfig;
use state::AppState;

/// Build the full router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
        .nest("/api", api::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Serve until Ctrl+C or SIGTERM
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.listen_addr()?;
    let state = AppState::from_config(config)?;
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

async fn status() -> impl IntoResponse {
    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "core_version": commander_ledger_core::VERSION,
        "service": "commander-ledger",
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
