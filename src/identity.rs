//! Caller identity resolution
//!
//! The upstream proxy (Open WebUI or anything speaking its header dialect)
//! injects identity headers on every request. The set is heterogeneous: some
//! callers send the Open WebUI headers, some send the generic `x-user-id` /
//! `x-session-id` pair, some send nothing. `resolve` folds whatever arrived into
//! one `IdentityEnvelope` so logging and billing see a uniform shape.
//!
//! Headers are trusted as-is. Nothing here authenticates anyone.

use axum::http::HeaderMap;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Header names
// ─────────────────────────────────────────────────────────────────────────────

pub const REQUEST_ID: &str = "x-request-id";
pub const PRIMARY_USER_ID: &str = "x-openwebui-user-id";
pub const SECONDARY_USER_ID: &str = "x-user-id";
pub const USER_EMAIL: &str = "x-openwebui-user-email";
pub const USER_NAME: &str = "x-openwebui-user-name";
pub const USER_ROLE: &str = "x-openwebui-user-role";
pub const WORKSPACE_ID: &str = "x-workspace-id";
pub const PRIMARY_SESSION_ID: &str = "x-openwebui-chat-id";
pub const SECONDARY_SESSION_ID: &str = "x-session-id";
pub const CLIENT_ID: &str = "x-client-id";

/// Client id used when the caller does not name itself
pub const DEFAULT_CLIENT_ID: &str = "owui";

/// Headers copied into `IdentityEnvelope::raw`
const RAW_SNAPSHOT: [&str; 2] = [PRIMARY_USER_ID, PRIMARY_SESSION_ID];

// ─────────────────────────────────────────────────────────────────────────────
// Envelope
// ─────────────────────────────────────────────────────────────────────────────

/// Where `session_id` came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionIdSource {
    /// `x-openwebui-chat-id`
    PrimaryHeader,
    /// `x-session-id`
    FallbackHeader,
    /// No header; a fresh id was minted because the caller required one
    Generated,
    /// No header and none required; `session_id` is `None`
    Missing,
}

impl SessionIdSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionIdSource::PrimaryHeader => "primary_header",
            SessionIdSource::FallbackHeader => "fallback_header",
            SessionIdSource::Generated => "generated",
            SessionIdSource::Missing => "missing",
        }
    }
}

impl std::fmt::Display for SessionIdSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized identity for one request
///
/// Built once by `resolve`, read-only afterwards, dropped with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityEnvelope {
    pub request_id: String,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub user_role: Option<String>,
    pub workspace_id: Option<String>,
    pub session_id: Option<String>,
    pub session_id_source: SessionIdSource,
    pub client_id: String,
    /// Original header values kept for audit; never consulted for logic
    pub raw: BTreeMap<String, Option<String>>,
}

/// Build the identity envelope for a request
///
/// Each field is resolved independently; no combination of present or absent
/// headers is an error. When `require_session` is set and neither session
/// header is present, a random session id is minted.
pub fn resolve(headers: &HeaderMap, require_session: bool) -> IdentityEnvelope {
    let request_id = header(headers, REQUEST_ID).unwrap_or_else(new_id);

    let user_id = header(headers, PRIMARY_USER_ID).or_else(|| header(headers, SECONDARY_USER_ID));

    let (session_id, session_id_source) = if let Some(id) = header(headers, PRIMARY_SESSION_ID) {
        (Some(id), SessionIdSource::PrimaryHeader)
    } else if let Some(id) = header(headers, SECONDARY_SESSION_ID) {
        (Some(id), SessionIdSource::FallbackHeader)
    } else if require_session {
        (Some(new_id()), SessionIdSource::Generated)
    } else {
        (None, SessionIdSource::Missing)
    };

    let raw = RAW_SNAPSHOT
        .iter()
        .map(|name| (name.to_string(), header(headers, name)))
        .collect();

    IdentityEnvelope {
        request_id,
        user_id,
        user_email: header(headers, USER_EMAIL),
        user_name: header(headers, USER_NAME),
        user_role: header(headers, USER_ROLE),
        workspace_id: header(headers, WORKSPACE_ID),
        session_id,
        session_id_source,
        client_id: header(headers, CLIENT_ID).unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
        raw,
    }
}

/// Header value as a string; only a missing or empty header counts as absent
///
/// Values are read as UTF-8 when they are valid UTF-8 (display names like
/// "José"), otherwise byte-for-byte as Latin-1, so a present header always
/// yields a value.
fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    let bytes = headers.get(name)?.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    Some(match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    })
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn is_uuid(s: &str) -> bool {
        Uuid::parse_str(s).is_ok()
    }

    #[test]
    fn test_primary_session_header() {
        let env = resolve(&headers(&[(PRIMARY_SESSION_ID, "abc")]), false);
        assert_eq!(env.session_id.as_deref(), Some("abc"));
        assert_eq!(env.session_id_source, SessionIdSource::PrimaryHeader);
    }

    #[test]
    fn test_primary_session_wins_over_fallback() {
        let env = resolve(
            &headers(&[(PRIMARY_SESSION_ID, "abc"), (SECONDARY_SESSION_ID, "xyz")]),
            true,
        );
        assert_eq!(env.session_id.as_deref(), Some("abc"));
        assert_eq!(env.session_id_source, SessionIdSource::PrimaryHeader);
    }

    #[test]
    fn test_fallback_session_header() {
        let env = resolve(&headers(&[(SECONDARY_SESSION_ID, "xyz")]), false);
        assert_eq!(env.session_id.as_deref(), Some("xyz"));
        assert_eq!(env.session_id_source, SessionIdSource::FallbackHeader);
    }

    #[test]
    fn test_session_generated_when_required() {
        let env = resolve(&HeaderMap::new(), true);
        let session = env.session_id.expect("session should be generated");
        assert!(is_uuid(&session));
        assert_eq!(env.session_id_source, SessionIdSource::Generated);
    }

    #[test]
    fn test_session_missing_when_not_required() {
        let env = resolve(&HeaderMap::new(), false);
        assert_eq!(env.session_id, None);
        assert_eq!(env.session_id_source, SessionIdSource::Missing);
    }

    #[test]
    fn test_empty_session_header_is_absent() {
        let env = resolve(&headers(&[(PRIMARY_SESSION_ID, ""), (SECONDARY_SESSION_ID, "xyz")]), false);
        assert_eq!(env.session_id.as_deref(), Some("xyz"));
        assert_eq!(env.session_id_source, SessionIdSource::FallbackHeader);
    }

    #[test]
    fn test_non_ascii_values_are_present() {
        let mut map = HeaderMap::new();
        map.insert(USER_NAME, HeaderValue::from_bytes("José".as_bytes()).unwrap());
        map.insert(
            PRIMARY_SESSION_ID,
            HeaderValue::from_bytes("chat-é".as_bytes()).unwrap(),
        );
        map.insert(SECONDARY_SESSION_ID, HeaderValue::from_static("xyz"));

        let env = resolve(&map, false);
        assert_eq!(env.user_name.as_deref(), Some("José"));
        assert_eq!(env.session_id.as_deref(), Some("chat-é"));
        assert_eq!(env.session_id_source, SessionIdSource::PrimaryHeader);
        assert_eq!(
            env.raw.get(PRIMARY_SESSION_ID).cloned().flatten().as_deref(),
            Some("chat-é")
        );
    }

    #[test]
    fn test_non_utf8_value_read_as_latin1() {
        let mut map = HeaderMap::new();
        // "Jos\xe9": Latin-1 encoded, invalid as UTF-8
        map.insert(USER_NAME, HeaderValue::from_bytes(b"Jos\xe9").unwrap());

        let env = resolve(&map, false);
        assert_eq!(env.user_name.as_deref(), Some("José"));
    }

    #[test]
    fn test_request_id_generated_fresh_each_call() {
        let a = resolve(&HeaderMap::new(), false);
        let b = resolve(&HeaderMap::new(), false);
        assert!(is_uuid(&a.request_id));
        assert!(is_uuid(&b.request_id));
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_request_id_propagated() {
        let env = resolve(&headers(&[(REQUEST_ID, "req-42")]), false);
        assert_eq!(env.request_id, "req-42");
    }

    #[test]
    fn test_user_id_precedence() {
        let both = resolve(
            &headers(&[(PRIMARY_USER_ID, "owui-user"), (SECONDARY_USER_ID, "plain-user")]),
            false,
        );
        assert_eq!(both.user_id.as_deref(), Some("owui-user"));

        let fallback = resolve(&headers(&[(SECONDARY_USER_ID, "plain-user")]), false);
        assert_eq!(fallback.user_id.as_deref(), Some("plain-user"));

        let none = resolve(&HeaderMap::new(), false);
        assert_eq!(none.user_id, None);
    }

    #[test]
    fn test_verbatim_fields_and_header_case() {
        let mut map = HeaderMap::new();
        for (name, value) in [
            ("X-OpenWebUI-User-Email", "a@b.c"),
            ("X-OPENWEBUI-USER-NAME", "Ada Lovelace"),
            ("x-openwebui-user-role", "admin"),
            ("X-Workspace-Id", "ws-1"),
        ] {
            let name = HeaderName::from_bytes(name.as_bytes()).unwrap();
            map.insert(name, HeaderValue::from_static(value));
        }

        let env = resolve(&map, false);
        assert_eq!(env.user_email.as_deref(), Some("a@b.c"));
        assert_eq!(env.user_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(env.user_role.as_deref(), Some("admin"));
        assert_eq!(env.workspace_id.as_deref(), Some("ws-1"));
    }

    #[test]
    fn test_client_id_default_and_override() {
        assert_eq!(resolve(&HeaderMap::new(), false).client_id, DEFAULT_CLIENT_ID);
        assert_eq!(
            resolve(&headers(&[(CLIENT_ID, "cli")]), false).client_id,
            "cli"
        );
    }

    #[test]
    fn test_raw_snapshot() {
        let env = resolve(
            &headers(&[(PRIMARY_USER_ID, "u1"), (SECONDARY_SESSION_ID, "s2")]),
            false,
        );
        assert_eq!(env.raw.len(), 2);
        assert_eq!(env.raw[PRIMARY_USER_ID].as_deref(), Some("u1"));
        assert_eq!(env.raw[PRIMARY_SESSION_ID], None);
    }

    #[test]
    fn test_source_serializes_snake_case() {
        let json = serde_json::to_string(&SessionIdSource::FallbackHeader).unwrap();
        assert_eq!(json, "\"fallback_header\"");
        assert_eq!(SessionIdSource::Missing.to_string(), "missing");
    }
}
