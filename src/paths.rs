//! XDG-compliant path resolution for rxgraph.
//!
//! Only two directories matter: where the config file lives and where the
//! resolution cache is kept.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::store::CacheBackend;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(rx::paths::no_home),
        help("Set the HOME environment variable or pass --config and --cache explicitly.")
    )]
    NoHome,
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global XDG-compliant directories for rxgraph.
#[derive(Debug, Clone)]
pub struct RxPaths {
    /// `$XDG_CONFIG_HOME/rxgraph/`
    pub config_dir: PathBuf,
    /// `$XDG_CACHE_HOME/rxgraph/`
    pub cache_dir: PathBuf,
}

impl RxPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("rxgraph");

        let cache_dir = std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".cache"))
            .join("rxgraph");

        Ok(Self {
            config_dir,
            cache_dir,
        })
    }

    /// Path to the global config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Default resolution cache file for `backend`.
    pub fn cache_file(&self, backend: CacheBackend) -> PathBuf {
        match backend {
            CacheBackend::Redb => self.cache_dir.join("resolutions.redb"),
            CacheBackend::Json | CacheBackend::Memory => self.cache_dir.join("resolutions.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_paths_use_xdg_layout() {
        // Reads the environment without mutating it (unsafe in edition 2024).
        let paths = RxPaths::resolve().unwrap();
        assert!(
            paths.config_dir.to_string_lossy().contains("rxgraph"),
            "config_dir should contain 'rxgraph': {}",
            paths.config_dir.display()
        );
        assert!(paths.config_file().starts_with(&paths.config_dir));
    }

    #[test]
    fn cache_file_depends_on_backend() {
        let paths = RxPaths {
            config_dir: PathBuf::from("/cfg/rxgraph"),
            cache_dir: PathBuf::from("/cache/rxgraph"),
        };
        assert_eq!(
            paths.cache_file(CacheBackend::Json),
            PathBuf::from("/cache/rxgraph/resolutions.json")
        );
        assert_eq!(
            paths.cache_file(CacheBackend::Redb),
            PathBuf::from("/cache/rxgraph/resolutions.redb")
        );
    }
}
