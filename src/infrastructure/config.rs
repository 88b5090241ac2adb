// src/infrastructure/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{
    DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BACKOFF_MS, DEFAULT_TIMEOUT_SECS,
};

/// TOML configuration for ankipush
///
/// Everything is optional in the file; missing members fall back to their
/// defaults. The loaded value is passed into components at construction,
/// nothing reads configuration ambiently.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub connect: ConnectConfig,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub launch: LaunchConfig,
}

/// How to reach AnkiConnect.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ConnectConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Note defaults applied to every submission.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Defaults {
    #[serde(default = "default_deck")]
    pub deck: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_front_field")]
    pub front_field: String,
    #[serde(default = "default_back_field")]
    pub back_field: String,
    #[serde(default)]
    pub allow_duplicate: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// How to start Anki when it is not running.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LaunchConfig {
    #[serde(default = "default_launch_command")]
    pub command: String,
    #[serde(default = "default_launch_args")]
    pub args: Vec<String>,
}

// Default value functions
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_retry_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF_MS
}
fn default_deck() -> String {
    "Default".to_string()
}
fn default_model() -> String {
    "Basic".to_string()
}
fn default_front_field() -> String {
    "Front".to_string()
}
fn default_back_field() -> String {
    "Back".to_string()
}
fn default_launch_command() -> String {
    if cfg!(target_os = "macos") {
        "open".to_string()
    } else {
        "anki".to_string()
    }
}
fn default_launch_args() -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec!["-a".to_string(), "Anki".to_string()]
    } else {
        Vec::new()
    }
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            deck: default_deck(),
            model: default_model(),
            front_field: default_front_field(),
            back_field: default_back_field(),
            allow_duplicate: false,
            tags: Vec::new(),
        }
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            command: default_launch_command(),
            args: default_launch_args(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// Resolve the effective configuration.
    ///
    /// An explicitly given path must exist and parse. Without one, the
    /// platform config file is used when present; otherwise the built-in
    /// defaults apply.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(?path, "Loading configuration from explicit path");
            return Self::load(path);
        }

        let path = Self::default_path()?;
        if path.exists() {
            debug!(?path, "Loading configuration from default path");
            Self::load(&path)
        } else {
            debug!(?path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Well-known location of the config file for this platform.
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not find config directory")?;
        Ok(base.join("ankipush").join("config.toml"))
    }
}
