//! Configuration module for gavel.

use serde::Deserialize;
use std::path::Path;

use crate::{GavelError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/gavel.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Event bus configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Number of events buffered per subscriber before the oldest are dropped.
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

fn default_event_capacity() -> usize {
    100
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/gavel.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Event bus configuration.
    #[serde(default)]
    pub events: EventsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GavelError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| GavelError::Config(format!("config parse error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.database.path, "data/gavel.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.events.capacity, 100);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/gavel.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse(
            r#"
            [database]
            path = "test.db"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, "test.db");
        // Defaults fill in the rest
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.events.capacity, 100);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "logs/gavel.log");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.database.path, "data/gavel.db");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("database = \"not a table\"");
        assert!(matches!(result, Err(GavelError::Config(_))));
    }
}
