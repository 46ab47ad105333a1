//! Client configuration

use pigpio_core::{DEFAULT_HOST, DEFAULT_PORT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Connection and behaviour settings for a [`Session`](crate::Session)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Daemon host name or address
    #[serde(default = "default_host")]
    pub host: String,
    /// Daemon TCP port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Timeout for establishing the TCP connection
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Timeout for each write and each response read
    #[serde(default = "default_timeout_ms")]
    pub io_timeout_ms: u64,
    /// Reject handles that were not opened through this session
    #[serde(default = "default_true")]
    pub strict_handles: bool,
    /// Close outstanding handles when the session is closed
    #[serde(default = "default_true")]
    pub close_handles_on_shutdown: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_timeout_ms(),
            io_timeout_ms: default_timeout_ms(),
            strict_handles: true,
            close_handles_on_shutdown: true,
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded client configuration");
        Ok(config)
    }

    /// Load configuration or fall back to defaults if the file doesn't exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            info!(
                path = %path.display(),
                "Client configuration not found, using defaults"
            );
            Ok(Self::default())
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}
