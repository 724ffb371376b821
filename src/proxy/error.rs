//! Proxy error types and response handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::BackendConfig;

/// Errors that can occur during proxying
///
/// Backend HTTP error statuses are not errors here: any response the backend
/// produces is passed through. These variants cover the cases where no
/// backend response exists to pass through.
#[derive(Debug)]
pub(crate) enum ProxyError {
    /// Inbound body could not be read
    BodyRead(String),
    /// Backend connection could not be established
    Unreachable {
        backend: String,
        base_url: String,
        detail: String,
    },
    /// Buffered forward exceeded the backend timeout
    Timeout {
        backend: String,
        base_url: String,
        after_secs: u64,
    },
    /// Any other transport failure talking to the backend
    Upstream {
        backend: String,
        base_url: String,
        detail: String,
    },
    ResponseBuild(String),
}

impl ProxyError {
    /// Classify a reqwest failure against the backend it was talking to
    pub(crate) fn from_backend(err: reqwest::Error, backend: &BackendConfig) -> Self {
        let name = backend.name.clone();
        let base_url = backend.url.clone();

        if err.is_timeout() {
            ProxyError::Timeout {
                backend: name,
                base_url,
                after_secs: backend.timeout_secs,
            }
        } else if err.is_connect() {
            ProxyError::Unreachable {
                backend: name,
                base_url,
                detail: error_chain(&err),
            }
        } else {
            ProxyError::Upstream {
                backend: name,
                base_url,
                detail: error_chain(&err),
            }
        }
    }

    /// A streamed forward failed before the backend answered
    ///
    /// No bytes have reached the caller, so a generic transport failure (for
    /// instance the connection closing before response headers) is reported
    /// the same as a refused connection. Timeouts keep their own variant.
    pub(crate) fn before_first_byte(self) -> Self {
        match self {
            ProxyError::Upstream {
                backend,
                base_url,
                detail,
            } => ProxyError::Unreachable {
                backend,
                base_url,
                detail,
            },
            other => other,
        }
    }

    pub(crate) fn status(&self) -> StatusCode {
        match self {
            ProxyError::BodyRead(_) => StatusCode::BAD_REQUEST,
            ProxyError::Unreachable { .. } | ProxyError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::ResponseBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ProxyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProxyError::BodyRead(msg) => write!(f, "Failed to read request body: {msg}"),
            ProxyError::Unreachable {
                backend,
                base_url,
                detail,
            } => write!(f, "Upstream {backend} unreachable at {base_url}: {detail}"),
            ProxyError::Timeout {
                backend,
                base_url,
                after_secs,
            } => write!(
                f,
                "Upstream {backend} timed out after {after_secs}s at {base_url}"
            ),
            ProxyError::Upstream {
                backend,
                base_url,
                detail,
            } => write!(f, "Upstream {backend} request failed at {base_url}: {detail}"),
            ProxyError::ResponseBuild(msg) => write!(f, "Failed to build response: {msg}"),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        tracing::error!(status = status.as_u16(), "Proxy error: {}", message);

        (status, Json(json!({ "error": { "message": message } }))).into_response()
    }
}

/// Render an error and its sources as "outer: inner: root"
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
