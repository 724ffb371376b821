//! Buffered forwarding: one request out, one complete response back

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderValue, Response},
};
use std::time::Instant;

use super::request::ProxyRequest;
use crate::proxy::error::ProxyError;
use crate::proxy::state::ProxyState;

/// Forward `req` to `path` on the backend and wait for the whole response
///
/// Bounded by the backend timeout. The backend's status and body are returned
/// unchanged; of its headers only `content-type` survives, defaulting to JSON.
pub(crate) async fn forward(
    state: &ProxyState,
    req: ProxyRequest,
    path: &str,
) -> Result<Response<Body>, ProxyError> {
    let start = Instant::now();
    let backend = &state.backend;
    let url = backend.url_for(path, req.query.as_deref());

    tracing::debug!(method = %req.method, %url, body_bytes = req.body.len(), "Forwarding buffered");

    let response = state
        .client
        .request(req.method, &url)
        .headers(req.headers)
        .body(req.body)
        .timeout(backend.timeout())
        .send()
        .await
        .map_err(|e| ProxyError::from_backend(e, backend))?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    // The timeout covers the body read too, so this can still classify as 504
    let body = response
        .bytes()
        .await
        .map_err(|e| ProxyError::from_backend(e, backend))?;

    tracing::debug!(
        status = status.as_u16(),
        body_bytes = body.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Backend responded"
    );

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .map_err(|e| ProxyError::ResponseBuild(e.to_string()))
}
