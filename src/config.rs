//! rxgraph configuration, persisted as TOML.
//!
//! Every field has a serde default, so an empty or partial file is valid.
//! Lives at `$XDG_CONFIG_HOME/rxgraph/config.toml` unless a path is given.

use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::sampling::SamplingConfig;
use crate::paths::{PathError, RxPaths};
use crate::resolve::rxnorm::{DEFAULT_BASE_URL, RxNormClient};
use crate::store::CacheBackend;

/// Errors from loading or saving configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(rx::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(rx::config::parse),
        help("Check the TOML syntax. Valid sections are [cache], [sampling] and [upstream].")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(rx::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Paths(#[from] PathError),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// `[cache]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    /// Cache file. `None` uses the XDG cache directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl CacheConfig {
    /// The cache file, falling back to the XDG default for the backend.
    pub fn resolved_path(&self) -> ConfigResult<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(RxPaths::resolve()?.cache_file(self.backend)),
        }
    }
}

/// `[upstream]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    /// Build the name-service client.
    pub fn client(&self) -> RxNormClient {
        RxNormClient::new(&self.base_url, Duration::from_secs(self.timeout_secs))
    }
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RxGraphConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl RxGraphConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load `path` if given, else the XDG config file if it exists, else defaults.
    pub fn discover(path: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default_file = RxPaths::resolve()?.config_file();
        if default_file.is_file() {
            tracing::debug!(path = %default_file.display(), "loading config");
            Self::load(&default_file)
        } else {
            Ok(Self::default())
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}
