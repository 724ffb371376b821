//! Database handle for the health check
//!
//! One r2d2 pool of SQLite connections, created at startup and handed to the
//! router state. Nothing in the forwarding path touches it; it exists so
//! `/health/db` can prove the database answers a round trip.
//!
//! ```text
//! GET /health/db
//!         │
//!         └──→ Database (r2d2 pool, spawn_blocking)
//!                 │
//!                 └──→ SQLite connection ── SELECT 1
//! ```
//!
//! The pool is built lazily: no connection is opened until the first health check,
//! so a missing or locked database shows up as a failed check rather than a
//! failed startup.

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

/// Shared, clonable pool handle
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
    label: String,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("label", &self.label)
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl Database {
    /// Build the pool for the configured SQLite file
    ///
    /// Creates the parent directory so the first connection can create the file.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }

        let manager = SqliteConnectionManager::file(&config.path);
        Ok(Self::from_manager(
            manager,
            config,
            config.path.display().to_string(),
        ))
    }

    /// Pool over a private in-memory database
    #[cfg(test)]
    pub fn in_memory() -> Self {
        let config = DatabaseConfig {
            path: std::path::PathBuf::from(":memory:"),
            pool_size: 1,
            connect_timeout_secs: 1,
        };
        Self::from_manager(SqliteConnectionManager::memory(), &config, ":memory:".into())
    }

    fn from_manager(manager: SqliteConnectionManager, config: &DatabaseConfig, label: String) -> Self {
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .min_idle(Some(0))
            .connection_timeout(config.connect_timeout())
            .build_unchecked(manager);

        Self { pool, label }
    }

    /// Where the pool points, for logs
    pub fn label(&self) -> &str {
        &self.label
    }

    /// One round trip on a pooled connection (blocking)
    pub fn ping(&self) -> Result<()> {
        let conn = self
            .pool
            .get()
            .context("Failed to check out database connection")?;
        let one: i64 = conn
            .query_row("SELECT 1", [], |row| row.get(0))
            .context("Database round trip failed")?;
        anyhow::ensure!(one == 1, "Database returned {one} for SELECT 1");
        Ok(())
    }

    /// `ping` on the blocking thread pool
    pub async fn ping_async(&self) -> Result<()> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.ping())
            .await
            .context("Database health check task panicked")?
    }
}
