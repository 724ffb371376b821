//! Request-boundary logging
//!
//! Every inbound request is attributed before it reaches a handler: identity
//! fields at info, the full header name list at debug. Keys are logged only
//! as a fingerprint. The resolved `IdentityEnvelope` is stored in the request
//! extensions so handlers see the same envelope (and request id) as the log.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use super::helpers::api_key_fingerprint;
use crate::identity;

pub(crate) async fn log_request(mut req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let envelope = identity::resolve(req.headers(), false);
    let api_key_hash = api_key_fingerprint(req.headers());

    tracing::info!(
        request_id = %envelope.request_id,
        user_id = envelope.user_id.as_deref().unwrap_or("-"),
        session_id = envelope.session_id.as_deref().unwrap_or("-"),
        session_id_source = %envelope.session_id_source,
        workspace_id = envelope.workspace_id.as_deref().unwrap_or("-"),
        client_id = %envelope.client_id,
        api_key_hash = api_key_hash.as_deref().unwrap_or("-"),
        "{} {}",
        method,
        path
    );

    if tracing::enabled!(tracing::Level::DEBUG) {
        let names: Vec<&str> = req.headers().keys().map(|k| k.as_str()).collect();
        tracing::debug!(request_id = %envelope.request_id, headers = ?names, "Inbound headers");
    }

    let request_id = envelope.request_id.clone();
    req.extensions_mut().insert(envelope);

    let response = next.run(req).await;

    tracing::info!(
        request_id = %request_id,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "{} {} done",
        method,
        path
    );

    response
}
