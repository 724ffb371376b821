//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the config as a commented TOML file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# inference-router configuration
# Environment variables override values here (see comments).

# ROUTER_BIND
bind_addr = "{bind_addr}"

[backend]
# ROUTER_BACKEND_URL
url = "{backend_url}"
# ROUTER_BACKEND_NAME - used in "upstream unreachable" messages
name = "{backend_name}"
# ROUTER_BACKEND_TIMEOUT_SECS - buffered requests only; streams never time out
timeout_secs = {timeout_secs}

[database]
# ROUTER_DATABASE_PATH
path = "{db_path}"
pool_size = {pool_size}
connect_timeout_secs = {connect_timeout_secs}

[logging]
# RUST_LOG takes precedence over this level
level = "{level}"
file_enabled = {file_enabled}
file_dir = "{file_dir}"
file_rotation = "{file_rotation}"  # hourly, daily, never
file_prefix = "{file_prefix}"
"#,
            bind_addr = self.bind_addr,
            backend_url = escape(&self.backend.url),
            backend_name = escape(&self.backend.name),
            timeout_secs = self.backend.timeout_secs,
            db_path = escape(&self.database.path.display().to_string()),
            pool_size = self.database.pool_size,
            connect_timeout_secs = self.database.connect_timeout_secs,
            level = escape(&self.logging.level),
            file_enabled = self.logging.file_enabled,
            file_dir = escape(&self.logging.file_dir.display().to_string()),
            file_rotation = self.logging.file_rotation.as_str(),
            file_prefix = escape(&self.logging.file_prefix),
        )
    }
}

/// Escape a value for a TOML basic string
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
