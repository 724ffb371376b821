// Health endpoints

use super::ApiError;
use crate::proxy::ProxyState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// GET /health - the process is up and serving
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// GET /health/db - one round trip on a pooled database connection
pub async fn health_db(State(state): State<ProxyState>) -> Result<Json<Value>, ApiError> {
    state.database.ping_async().await.map_err(|e| {
        ApiError::Unavailable(format!(
            "Database {} unavailable: {:#}",
            state.database.label(),
            e
        ))
    })?;

    Ok(Json(json!({ "ok": true })))
}
