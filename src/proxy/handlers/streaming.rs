//! Streaming forwarding: relay backend chunks to the caller as they arrive
//!
//! No timeout applies; a generation may legitimately run for minutes. The
//! relay owns the backend response, so when the caller goes away and axum
//! drops the body, the backend connection goes with it.

use axum::{
    body::Body,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        Response,
    },
};
use bytes::Bytes;
use futures::Stream;
use std::{
    fmt::Display,
    io,
    pin::Pin,
    task::{Context, Poll},
};

use super::request::ProxyRequest;
use crate::proxy::error::ProxyError;
use crate::proxy::state::ProxyState;

/// Open a streamed backend request for `path` and relay it
///
/// Only failures before the backend answers become a `ProxyError`; anything
/// after that happens inside the response body.
pub(crate) async fn forward(
    state: &ProxyState,
    req: ProxyRequest,
    path: &str,
) -> Result<Response<Body>, ProxyError> {
    let backend = &state.backend;
    let url = backend.url_for(path, req.query.as_deref());

    tracing::debug!(method = %req.method, %url, body_bytes = req.body.len(), "Forwarding streamed");

    let response = state
        .client
        .request(req.method, &url)
        .headers(req.headers)
        .body(req.body)
        .send()
        .await
        .map_err(|e| ProxyError::from_backend(e, backend).before_first_byte())?;

    let status = response.status();
    let relay = ChunkRelay::new(response.bytes_stream(), url);

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(relay))
        .map_err(|e| ProxyError::ResponseBuild(e.to_string()))
}

/// Pass-through stream over backend chunks
///
/// Drops empty chunks, counts what it relays, and logs how the stream ended.
/// After an error or the end of input it yields nothing more.
pub(crate) struct ChunkRelay<S> {
    inner: Pin<Box<S>>,
    label: String,
    chunks: u64,
    bytes: u64,
    finished: bool,
}

impl<S> ChunkRelay<S> {
    pub(crate) fn new(inner: S, label: String) -> Self {
        Self {
            inner: Box::pin(inner),
            label,
            chunks: 0,
            bytes: 0,
            finished: false,
        }
    }
}

impl<S, E> Stream for ChunkRelay<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    type Item = Result<Bytes, io::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        loop {
            match this.inner.as_mut().poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(chunk))) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    this.chunks += 1;
                    this.bytes += chunk.len() as u64;
                    return Poll::Ready(Some(Ok(chunk)));
                }
                Poll::Ready(Some(Err(e))) => {
                    this.finished = true;
                    tracing::warn!(
                        url = %this.label,
                        chunks = this.chunks,
                        bytes = this.bytes,
                        "Backend stream failed mid-transfer: {}",
                        e
                    );
                    return Poll::Ready(Some(Err(io::Error::other(e.to_string()))));
                }
                Poll::Ready(None) => {
                    this.finished = true;
                    tracing::debug!(
                        url = %this.label,
                        chunks = this.chunks,
                        bytes = this.bytes,
                        "Backend stream complete"
                    );
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl<S> Drop for ChunkRelay<S> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                url = %self.label,
                chunks = self.chunks,
                bytes = self.bytes,
                "Caller disconnected, releasing backend stream"
            );
        }
    }
}
