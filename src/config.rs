//! pgtext configuration (`pgtext.toml`).
//!
//! ```toml
//! [money]
//! symbol = "€"
//!
//! [output]
//! pretty = false
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::PgMoney;

/// File name looked up in the working directory and the user config dir.
pub const CONFIG_FILE: &str = "pgtext.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Main configuration. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub money: MoneyConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MoneyConfig {
    /// Currency symbol written in front of `money` amounts
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

fn default_symbol() -> String {
    "$".to_string()
}

impl Default for MoneyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_true(),
        }
    }
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Read and parse one file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve configuration: an explicit path must exist; otherwise
    /// `./pgtext.toml`, then `<config dir>/qail/pgtext.toml`, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading explicit config");
            return Self::from_path(path);
        }
        for path in Self::search_paths() {
            if path.is_file() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::from_path(&path);
            }
        }
        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Candidate locations, in lookup order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("qail").join(CONFIG_FILE));
        }
        paths
    }

    /// Money codec using the configured symbol.
    pub fn money(&self) -> PgMoney {
        PgMoney::new(self.money.symbol.clone())
    }
}
