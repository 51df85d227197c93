//! HTTP server for the chat relay.
//!
//! Provides REST endpoints for:
//! - Chat turns forwarded to the completion provider
//! - Resetting a conversation's history
//! - Health checks

pub mod error;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use routes::create_router;
pub use state::{AppState, StateError};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the router with CORS and request tracing layers.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with graceful shutdown support.
///
/// The server will stop accepting new connections when `shutdown_signal` completes.
///
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    port: u16,
    shutdown_signal: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Chat relay listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}

/// Resolves when the process receives Ctrl-C.
pub async fn ctrl_c_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
