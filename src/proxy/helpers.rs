//! Header utilities shared by both forwarding paths

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE, HOST},
    HeaderMap, HeaderValue,
};
use sha2::{Digest, Sha256};

/// Prepare inbound headers for re-transmission to the backend
///
/// Drops every `host` header (the client sets its own for the backend) and
/// defaults `content-type` to JSON. Everything else is copied as received,
/// multi-valued headers included. Rebuilds rather than removing in place
/// because `HeaderMap::remove` swaps entries and would reorder the rest.
pub(crate) fn sanitize_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len() + 1);
    for (name, value) in headers {
        if name != HOST {
            out.append(name.clone(), value.clone());
        }
    }
    if !out.contains_key(CONTENT_TYPE) {
        out.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    out
}

/// Short SHA-256 fingerprint of the caller's API key, for logs
///
/// Checks x-api-key first, then Authorization: Bearer. The key itself is
/// never logged.
pub(crate) fn api_key_fingerprint(headers: &HeaderMap) -> Option<String> {
    let key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
        .filter(|k| !k.is_empty())?;

    let hash = Sha256::digest(key.as_bytes());
    Some(format!("{:x}", hash)[..16].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderName;

    fn collect(headers: &HeaderMap) -> Vec<(String, String)> {
        headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap().to_string()))
            .collect()
    }

    #[test]
    fn test_sanitize_strips_host_and_defaults_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("router.local:8000"));
        headers.insert("x-openwebui-user-id", HeaderValue::from_static("u1"));

        let out = sanitize_headers(&headers);
        assert!(out.get(HOST).is_none());
        assert_eq!(out.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(out.get("x-openwebui-user-id").unwrap(), "u1");
    }

    #[test]
    fn test_sanitize_strips_every_host_value_any_case() {
        let mut headers = HeaderMap::new();
        let mixed_case = HeaderName::from_bytes(b"HoSt").unwrap();
        headers.append(mixed_case, HeaderValue::from_static("a"));
        headers.append(HOST, HeaderValue::from_static("b"));

        let out = sanitize_headers(&headers);
        assert!(out.get_all(HOST).iter().next().is_none());
    }

    #[test]
    fn test_sanitize_keeps_existing_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let out = sanitize_headers(&headers);
        let values: Vec<_> = out.get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, vec!["text/plain"]);
    }

    #[test]
    fn test_sanitize_preserves_order_and_duplicates() {
        let mut headers = HeaderMap::new();
        headers.append("x-first", HeaderValue::from_static("1"));
        headers.append(HOST, HeaderValue::from_static("h"));
        headers.append("accept", HeaderValue::from_static("text/event-stream"));
        headers.append("x-multi", HeaderValue::from_static("a"));
        headers.append("x-multi", HeaderValue::from_static("b"));
        headers.append(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let out = sanitize_headers(&headers);
        assert_eq!(
            collect(&out),
            vec![
                ("x-first".to_string(), "1".to_string()),
                ("accept".to_string(), "text/event-stream".to_string()),
                ("x-multi".to_string(), "a".to_string()),
                ("x-multi".to_string(), "b".to_string()),
                ("content-type".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let mut headers = HeaderMap::new();
        headers.append(HOST, HeaderValue::from_static("h"));
        headers.append("x-multi", HeaderValue::from_static("a"));
        headers.append("x-multi", HeaderValue::from_static("b"));

        let once = sanitize_headers(&headers);
        let twice = sanitize_headers(&once);
        assert_eq!(collect(&once), collect(&twice));
    }

    #[test]
    fn test_api_key_fingerprint() {
        let mut headers = HeaderMap::new();
        assert_eq!(api_key_fingerprint(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer sk-test"));
        let bearer = api_key_fingerprint(&headers).unwrap();
        assert_eq!(bearer.len(), 16);
        assert!(!bearer.contains("sk-test"));

        // x-api-key wins over Authorization
        headers.insert("x-api-key", HeaderValue::from_static("other-key"));
        let api_key = api_key_fingerprint(&headers).unwrap();
        assert_ne!(api_key, bearer);
    }

    #[test]
    fn test_api_key_fingerprint_ignores_non_bearer_auth() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(api_key_fingerprint(&headers), None);
    }
}
