//! Route handlers for the forwarded endpoints
//!
//! Models and embeddings always go through the buffered path. Chat
//! completions are routed by the `stream` flag in the request body.

mod buffered;
mod request;
mod streaming;

pub(crate) use request::ProxyRequest;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
};
use serde_json::Value;

use super::error::ProxyError;
use super::state::ProxyState;

pub(crate) const MODELS_PATH: &str = "/v1/models";
pub(crate) const EMBEDDINGS_PATH: &str = "/v1/embeddings";
pub(crate) const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Which forwarder a chat completion goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ForwardMode {
    Buffered,
    Streaming,
}

impl ForwardMode {
    /// Streaming only for a JSON object whose `stream` is literally `true`
    ///
    /// Anything unparseable is forwarded buffered and left for the backend
    /// to reject.
    pub(crate) fn for_chat_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) if map.get("stream") == Some(&Value::Bool(true)) => {
                ForwardMode::Streaming
            }
            Ok(_) => ForwardMode::Buffered,
            Err(e) => {
                tracing::debug!("Chat body is not valid JSON, forwarding buffered: {}", e);
                ForwardMode::Buffered
            }
        }
    }
}

/// GET /v1/models
pub(crate) async fn list_models(
    State(state): State<ProxyState>,
    req: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    let req = ProxyRequest::from_request(req).await?;
    buffered::forward(&state, req, MODELS_PATH).await
}

/// POST /v1/embeddings
pub(crate) async fn create_embeddings(
    State(state): State<ProxyState>,
    req: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    let req = ProxyRequest::from_request(req).await?;
    buffered::forward(&state, req, EMBEDDINGS_PATH).await
}

/// POST /v1/chat/completions
pub(crate) async fn chat_completions(
    State(state): State<ProxyState>,
    req: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    let req = ProxyRequest::from_request(req).await?;

    match ForwardMode::for_chat_body(&req.body) {
        ForwardMode::Streaming => streaming::forward(&state, req, CHAT_COMPLETIONS_PATH).await,
        ForwardMode::Buffered => buffered::forward(&state, req, CHAT_COMPLETIONS_PATH).await,
    }
}
