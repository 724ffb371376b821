//! Inbound request capture
//!
//! The body is read exactly once into `Bytes`; the resulting `ProxyRequest` is
//! moved into whichever forwarder the route picks.

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request},
};
use bytes::Bytes;

use crate::proxy::error::ProxyError;
use crate::proxy::helpers::sanitize_headers;

/// One inbound call, ready to be re-issued against the backend
#[derive(Debug)]
pub(crate) struct ProxyRequest {
    pub method: Method,
    /// Raw query string, forwarded verbatim (order and duplicates kept)
    pub query: Option<String>,
    /// Already sanitized for the backend
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyRequest {
    pub(crate) async fn from_request(req: Request<Body>) -> Result<Self, ProxyError> {
        let (parts, body) = req.into_parts();

        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| ProxyError::BodyRead(e.to_string()))?;

        Ok(Self {
            method: parts.method,
            query: parts.uri.query().map(String::from),
            headers: sanitize_headers(&parts.headers),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{CONTENT_TYPE, HOST};

    #[tokio::test]
    async fn test_from_request_captures_parts() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/v1/embeddings?b=2&a=1&a=3")
            .header(HOST, "router.local")
            .header("x-openwebui-user-id", "u1")
            .body(Body::from(r#"{"input":"hi"}"#))
            .unwrap();

        let captured = ProxyRequest::from_request(req).await.unwrap();
        assert_eq!(captured.method, Method::POST);
        assert_eq!(captured.query.as_deref(), Some("b=2&a=1&a=3"));
        assert!(captured.headers.get(HOST).is_none());
        assert_eq!(captured.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(captured.body, Bytes::from_static(br#"{"input":"hi"}"#));
    }

    #[tokio::test]
    async fn test_from_request_without_query() {
        let req = Request::builder()
            .uri("/v1/models")
            .body(Body::empty())
            .unwrap();

        let captured = ProxyRequest::from_request(req).await.unwrap();
        assert_eq!(captured.method, Method::GET);
        assert_eq!(captured.query, None);
        assert!(captured.body.is_empty());
    }
}
