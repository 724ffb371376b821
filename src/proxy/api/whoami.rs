// Whoami endpoint

use crate::identity::{IdentityEnvelope, SessionIdSource};
use axum::{Extension, Json};
use serde::Serialize;
use std::collections::BTreeMap;

/// Response for GET /v1/whoami
#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    pub request_id: String,
    pub identity: IdentitySummary,
    /// Primary identity headers exactly as received (absent = null)
    pub raw_hint: BTreeMap<String, Option<String>>,
}

/// Resolved identity fields; absent values serialize as null
#[derive(Debug, Serialize)]
pub struct IdentitySummary {
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub user_role: Option<String>,
    pub workspace_id: Option<String>,
    pub session_id: Option<String>,
    pub session_id_source: SessionIdSource,
    pub client_id: String,
}

impl From<IdentityEnvelope> for WhoamiResponse {
    fn from(env: IdentityEnvelope) -> Self {
        Self {
            request_id: env.request_id,
            identity: IdentitySummary {
                user_id: env.user_id,
                user_email: env.user_email,
                user_name: env.user_name,
                user_role: env.user_role,
                workspace_id: env.workspace_id,
                session_id: env.session_id,
                session_id_source: env.session_id_source,
                client_id: env.client_id,
            },
            raw_hint: env.raw,
        }
    }
}

/// GET /v1/whoami - Returns the identity the router resolved for this call
///
/// Reports the envelope the logging middleware resolved, so the response and
/// the request log agree on `request_id`. A session is not required here: a
/// caller without session headers sees `session_id: null` and
/// `session_id_source: "missing"`.
pub async fn whoami(Extension(envelope): Extension<IdentityEnvelope>) -> Json<WhoamiResponse> {
    tracing::debug!(
        request_id = %envelope.request_id,
        session_id_source = %envelope.session_id_source,
        "whoami"
    );
    Json(envelope.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity;
    use axum::http::{HeaderMap, HeaderValue};
    use serde_json::json;

    async fn whoami_for(headers: HeaderMap) -> WhoamiResponse {
        let Json(resp) = whoami(Extension(identity::resolve(&headers, false))).await;
        resp
    }

    #[tokio::test]
    async fn test_whoami_shape_without_headers() {
        let resp = whoami_for(HeaderMap::new()).await;
        let value = serde_json::to_value(&resp).unwrap();

        assert!(value["request_id"].as_str().is_some_and(|s| !s.is_empty()));
        assert_eq!(
            value["identity"],
            json!({
                "user_id": null,
                "user_email": null,
                "user_name": null,
                "user_role": null,
                "workspace_id": null,
                "session_id": null,
                "session_id_source": "missing",
                "client_id": "owui",
            })
        );
        assert_eq!(
            value["raw_hint"],
            json!({ "x-openwebui-chat-id": null, "x-openwebui-user-id": null })
        );
    }

    #[tokio::test]
    async fn test_whoami_reports_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("req-1"));
        headers.insert("x-user-id", HeaderValue::from_static("fallback-user"));
        headers.insert("x-session-id", HeaderValue::from_static("s-9"));
        headers.insert("x-workspace-id", HeaderValue::from_static("ws"));

        let resp = whoami_for(headers).await;
        let value = serde_json::to_value(&resp).unwrap();

        assert_eq!(value["request_id"], "req-1");
        assert_eq!(value["identity"]["user_id"], "fallback-user");
        assert_eq!(value["identity"]["session_id"], "s-9");
        assert_eq!(value["identity"]["session_id_source"], "fallback_header");
        assert_eq!(value["identity"]["workspace_id"], "ws");
        assert_eq!(value["raw_hint"]["x-openwebui-user-id"], json!(null));
    }
}
