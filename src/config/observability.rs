//! `[logging]` section
//!
//! Stdout logging is always on; the JSON file sink is opt-in. Both the level
//! and the rotation are checked when the file is loaded so a typo stops
//! startup instead of silently logging at some other level.

use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Levels accepted in `logging.level`
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// When the JSON log file rolls over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    /// One file, never rolled
    Never,
}

impl LogRotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Lowercase, one of trace/debug/info/warn/error
    pub level: String,
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
    /// File name stem; the appender adds the date suffix
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_rotation: LogRotation::Daily,
            file_prefix: "router".to_string(),
        }
    }
}

/// `[logging]` as written in the config file
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<PathBuf>,
    pub file_rotation: Option<LogRotation>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    pub fn from_file(file: Option<FileLogging>) -> Result<Self> {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let level = match file.level {
            Some(raw) => normalize_level(&raw)?,
            None => defaults.level,
        };

        let file_prefix = file.file_prefix.unwrap_or(defaults.file_prefix);
        if file_prefix.trim().is_empty() {
            bail!("logging.file_prefix must not be empty");
        }

        Ok(Self {
            level,
            file_enabled: file.file_enabled.unwrap_or(defaults.file_enabled),
            file_dir: file.file_dir.unwrap_or(defaults.file_dir),
            file_rotation: file.file_rotation.unwrap_or(defaults.file_rotation),
            file_prefix,
        })
    }
}

fn normalize_level(raw: &str) -> Result<String> {
    let level = raw.trim().to_ascii_lowercase();
    if !LEVELS.contains(&level.as_str()) {
        bail!(
            "Invalid logging.level {raw:?} (expected one of {})",
            LEVELS.join(", ")
        );
    }
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(toml_str: &str) -> Result<LoggingConfig> {
        let file: FileLogging = toml::from_str(toml_str)?;
        LoggingConfig::from_file(Some(file))
    }

    #[test]
    fn test_level_is_normalized() {
        assert_eq!(section("level = \" DEBUG \"").unwrap().level, "debug");
    }

    #[test]
    fn test_unknown_level_rejected() {
        let err = section("level = \"verbose\"").unwrap_err();
        assert!(err.to_string().contains("verbose"), "{err}");
    }

    #[test]
    fn test_rotation_values() {
        assert_eq!(
            section("file_rotation = \"hourly\"").unwrap().file_rotation,
            LogRotation::Hourly
        );
        assert_eq!(
            section("file_rotation = \"never\"").unwrap().file_rotation,
            LogRotation::Never
        );
        assert!(section("file_rotation = \"weekly\"").is_err());
    }

    #[test]
    fn test_empty_prefix_rejected() {
        assert!(section("file_prefix = \"  \"").is_err());
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        assert_eq!(
            LoggingConfig::from_file(None).unwrap(),
            LoggingConfig::default()
        );
    }
}
