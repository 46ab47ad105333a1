//! Configuration loading for pigctl

use anyhow::{Context, Result};
use pigpio_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Contents of `pigctl.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Print results as JSON objects instead of plain text
    #[serde(default)]
    pub json: bool,
}

/// Load configuration from file, or defaults if the file doesn't exist
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

impl Config {
    /// Apply command-line and environment overrides
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>, json: bool) -> Self {
        if let Some(host) = host {
            self.client.host = host;
        }
        if let Some(port) = port {
            self.client.port = port;
        }
        self.output.json |= json;
        self
    }
}
