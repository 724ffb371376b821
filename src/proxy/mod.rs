// Proxy module - HTTP gateway in front of the inference backend
//
// Requests to the OpenAI-compatible routes are forwarded to the backend with
// their method, query, headers (minus `host`) and body intact. Chat
// completions that ask for `stream: true` are relayed chunk by chunk; every
// other forward is buffered and bounded by the backend timeout.
//
// Module structure:
// - server: router construction and the serve loop
// - handlers/: route handlers, buffered and streaming forwarders
// - api/: endpoints answered locally (whoami, health)
// - middleware: request-boundary logging
// - helpers: header sanitizing and key fingerprints
// - error: ProxyError and its JSON rendering
// - state: shared handles

pub mod api;
mod error;
mod handlers;
mod helpers;
mod middleware;
mod server;
mod state;


pub use server::{build_router, start_proxy};
pub use state::ProxyState;
