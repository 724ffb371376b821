//! Shared proxy state

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::BackendConfig;
use crate::storage::Database;

/// Read-only handles shared by every request
///
/// All three are cheap to clone and created once at startup.
#[derive(Clone)]
pub struct ProxyState {
    /// HTTP client for forwarding requests (connection pool lives here)
    pub(crate) client: reqwest::Client,
    /// The backend every forwarded request goes to
    pub(crate) backend: Arc<BackendConfig>,
    /// Pool checked by /health/db
    pub(crate) database: Database,
}

impl ProxyState {
    pub fn new(backend: BackendConfig, database: Database) -> Result<Self> {
        // No client-wide timeout: buffered forwards set one per request and
        // streamed forwards must be allowed to run long.
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            // Local inference servers speak HTTP/1.1
            .http1_only()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            backend: Arc::new(backend),
            database,
        })
    }

    pub fn backend(&self) -> &BackendConfig {
        &self.backend
    }
}
