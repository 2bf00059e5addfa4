//! Client context configuration
//!
//! The compiler itself performs no I/O; this module loads the ambient
//! context (server endpoint, default project) that payload assembly may
//! consult for metadata defaults. Missing files fall back to defaults so a
//! bare environment still compiles.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The cirrus context configuration
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CirrusConfig {
    /// Management server connection details
    #[serde(default)]
    pub server: ServerConfig,

    /// Default project for submitted payloads
    #[serde(default)]
    pub project: ProjectConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Management server host
    #[serde(default)]
    pub host: String,

    /// Management server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username submitted as the default owner reference
    #[serde(default = "default_username")]
    pub username: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            username: default_username(),
        }
    }
}

fn default_port() -> u16 {
    9440
}

fn default_username() -> String {
    "admin".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProjectConfig {
    /// Default project name
    #[serde(default = "default_project")]
    pub name: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_project(),
        }
    }
}

fn default_project() -> String {
    "default".to_string()
}

impl CirrusConfig {
    /// Path of the context file: `~/.config/cirrus/config.toml`
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("cirrus").join("config.toml"))
    }

    /// Load the context from the default location, defaulting when absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the context from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("context file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Invalid TOML format in cirrus config")?;
        config.validate()?;
        Ok(config)
    }

    /// Save the context to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.project.name.is_empty() {
            anyhow::bail!("Project name cannot be empty");
        }
        if self.server.username.is_empty() {
            anyhow::bail!("Server username cannot be empty");
        }
        Ok(())
    }
}
