//! Runtime settings shared by every crate in the workspace.
//!
//! The structs mirror the section layout of the config file. A file may
//! name only the sections it wants to override, since every level falls
//! back to its default.

use serde::{Deserialize, Serialize};

/// Top-level settings, grouped by concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sweep: SweepConfig,
}

/// Listener address for the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 4000 }
    }
}

/// SQLite file location and pool sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "convene.db".to_string(), pool_size: 8 }
    }
}

/// Cadence of the background status sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Seconds between passes; the scheduler clamps this to at least one.
    pub interval_seconds: u64,
    /// Set false to run without the background task.
    pub enabled: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self { interval_seconds: 60, enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_local_setup() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.database.path, "convene.db");
        assert!(config.sweep.enabled);
    }

    #[test]
    fn partial_document_fills_missing_sections_with_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "server": { "port": 9000 } }"#).expect("parses");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database.pool_size, 8);
        assert_eq!(config.sweep.interval_seconds, 60);
    }
}
