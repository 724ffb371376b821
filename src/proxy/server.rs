//! Proxy server setup and initialization

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

use super::api;
use super::handlers::{self, CHAT_COMPLETIONS_PATH, EMBEDDINGS_PATH, MODELS_PATH};
use super::middleware::log_request;
use super::state::ProxyState;

/// Build the router: forwarded routes, local endpoints, request logging
pub fn build_router(state: ProxyState) -> Router {
    Router::new()
        // Forwarded to the backend
        .route(MODELS_PATH, get(handlers::list_models))
        .route(EMBEDDINGS_PATH, post(handlers::create_embeddings))
        .route(CHAT_COMPLETIONS_PATH, post(handlers::chat_completions))
        // Answered locally
        .route("/v1/whoami", get(api::whoami))
        .route("/health", get(api::health))
        .route("/health/db", get(api::health_db))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Start the proxy server
///
/// Serves until `shutdown_rx` fires, then drains in-flight requests.
pub async fn start_proxy(
    bind_addr: SocketAddr,
    state: ProxyState,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<()> {
    let backend = state.backend().clone();
    let app = build_router(state);

    tracing::info!("Starting proxy on {}", bind_addr);

    // Bind and serve
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;

    tracing::info!(
        "Proxy listening on {} -> {} ({})",
        bind_addr,
        backend.url,
        backend.name
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.await.ok();
        })
        .await
        .context("Server error")?;

    tracing::info!("Proxy server shut down gracefully");
    Ok(())
}
