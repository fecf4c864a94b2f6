/// Configuration management for the workflow playground
///
/// Handles server bind settings and where demo session data is stored.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Session storage configuration
    pub storage: StorageConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the session database (default: "data")
    pub data_dir: String,
}

impl StorageConfig {
    /// Path of the SQLite session database: {data_dir}/workflows.db
    pub fn sessions_db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("workflows.db")
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("PLAYGROUND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("PLAYGROUND_PORT")
                    .ok()
                    .and_then(|port| port.parse().ok())
                    .unwrap_or(7777),
            },
            storage: StorageConfig {
                data_dir: std::env::var("PLAYGROUND_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            },
        }
    }
}
