//! HTTP Server
//!
//! Axum server exposing the upload/results API and the static
//! frontend, with permissive CORS and graceful shutdown.

pub mod routes;
pub mod state;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub use state::AppState;

/// Uploaded statements can run long; 25 MiB covers them comfortably.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the full application router.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::serve_home))
        .route("/style.css", get(routes::serve_css))
        .merge(routes::api_router())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until ctrl-c / SIGTERM.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.bind_addr, state.config.port);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}

/// Resolve when the process receives SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("could not register SIGTERM handler: {}", e);
                let _ = ctrl_c.await;
                return;
            }
        };

        tokio::select! {
            _ = ctrl_c => info!("received SIGINT, shutting down"),
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("received shutdown signal");
    }
}
