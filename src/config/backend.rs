//! Backend and database configuration
//!
//! The router fronts exactly one OpenAI-compatible server. The database
//! section only feeds the /health/db check.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Backend
// ─────────────────────────────────────────────────────────────────────────────

/// Inference backend settings
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Base URL, no trailing slash (e.g. "http://127.0.0.1:1234")
    pub url: String,
    /// Human name used in error messages
    pub name: String,
    /// Upper bound for buffered requests; streamed requests have none
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:1234".to_string(),
            name: "LM Studio".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Backend settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileBackend {
    pub url: Option<String>,
    pub name: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl BackendConfig {
    /// Create from file config and environment, env winning
    pub fn from_file(
        file: Option<FileBackend>,
        env: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let url = env("ROUTER_BACKEND_URL")
            .or(file.url)
            .unwrap_or(defaults.url);
        let name = env("ROUTER_BACKEND_NAME")
            .or(file.name)
            .unwrap_or(defaults.name);
        let timeout_secs = match env("ROUTER_BACKEND_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid ROUTER_BACKEND_TIMEOUT_SECS: {raw}"))?,
            None => file.timeout_secs.unwrap_or(defaults.timeout_secs),
        };

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            name,
            timeout_secs,
        })
    }

    /// Timeout applied to buffered forwards
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full backend URL for a route path plus the caller's raw query string
    pub fn url_for(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}{}?{}", self.url, path, q),
            _ => format!("{}{}", self.url, path),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Database
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite pool settings
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,
    /// Maximum pooled connections
    pub pool_size: u32,
    /// How long a checkout may wait before the health check reports failure
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/router.db"),
            pool_size: 4,
            connect_timeout_secs: 5,
        }
    }
}

/// Database settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileDatabase {
    pub path: Option<String>,
    pub pool_size: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
}

impl DatabaseConfig {
    /// Create from file config and environment, env winning for the path
    pub fn from_file(file: Option<FileDatabase>, env: &impl Fn(&str) -> Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            path: env("ROUTER_DATABASE_PATH")
                .or(file.path)
                .map(PathBuf::from)
                .unwrap_or(defaults.path),
            pool_size: file.pool_size.unwrap_or(defaults.pool_size).max(1),
            // r2d2 rejects a zero checkout timeout
            connect_timeout_secs: file
                .connect_timeout_secs
                .unwrap_or(defaults.connect_timeout_secs)
                .max(1),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
