// Router-local endpoints - answered without contacting the backend
//
// - /v1/whoami: the identity envelope resolved from the caller's headers
// - /health, /health/db: liveness and database checks
//
// All endpoints return JSON.

mod health;
mod whoami;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub use health::{health, health_db};
pub use whoami::whoami;

/// API error responses
/// Converted to HTTP status codes via IntoResponse
#[derive(Debug)]
pub enum ApiError {
    /// A dependency the endpoint reports on is not answering
    Unavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        tracing::error!("API error: {} - {}", status, message);

        (status, Json(json!({ "ok": false, "error": message }))).into_response()
    }
}
