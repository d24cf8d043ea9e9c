//! Configuration file parsing and management

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = ".jobtrack.toml";

/// Configuration loaded from .jobtrack.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the remote application API
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
        }
    }
}

impl Config {
    /// Apply a command-line or environment override
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        self
    }
}

/// Load configuration from .jobtrack.toml in `dir`
pub fn load_config(dir: &Path) -> Result<Config> {
    let config_path = dir.join(CONFIG_FILE);

    if !config_path.exists() {
        tracing::debug!("No {} found, using defaults", CONFIG_FILE);
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(&config_path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", CONFIG_FILE, e))?;

    tracing::debug!("Loaded config from {}", config_path.display());
    Ok(config)
}

/// Walk up from `start` looking for a directory holding .jobtrack.toml
pub fn find_config_dir(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).exists())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| start.to_path_buf())
}

fn default_api_url() -> String { "http://localhost:3000".to_string() }
