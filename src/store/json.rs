//! Whole-file JSON cache store.
//!
//! The snapshot is one pretty-printed JSON object keyed by normalized term.
//! Flushes write a sibling temp file and rename it over the target, so a
//! crash mid-write leaves the previous snapshot intact.

use std::path::{Path, PathBuf};

use crate::error::StoreError;

use super::{CacheSnapshot, CacheStore, StoreResult};

/// [`CacheStore`] backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Use `path` as the cache file. Nothing is touched until load/flush.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CacheStore for JsonFileStore {
    fn load(&self) -> StoreResult<CacheSnapshot> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CacheSnapshot::new());
            }
            Err(e) => return Err(StoreError::Io { source: e }),
        };
        serde_json::from_str(&content).map_err(|e| StoreError::Serialization {
            message: format!("{}: {e}", self.path.display()),
        })
    }

    fn flush(&self, snapshot: &CacheSnapshot) -> StoreResult<()> {
        let content =
            serde_json::to_string_pretty(snapshot).map_err(|e| StoreError::Serialization {
                message: format!("failed to encode resolution cache: {e}"),
            })?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Io { source: e })?;
            }
        }
        let tmp = self.temp_path();
        std::fs::write(&tmp, content).map_err(|e| StoreError::Io { source: e })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io { source: e })?;
        tracing::debug!(path = %self.path.display(), terms = snapshot.len(), "flushed resolution cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Resolution;
    use tempfile::TempDir;

    fn snapshot() -> CacheSnapshot {
        let mut s = CacheSnapshot::new();
        s.insert(
            "tylenol".into(),
            Resolution::from([
                ("202433".to_string(), "Tylenol 325 MG Oral Tablet".to_string()),
                ("209387".to_string(), "Tylenol 500 MG Oral Tablet".to_string()),
            ]),
        );
        s
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn persistence_across_reopens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/cache.json");
        JsonFileStore::new(&path).flush(&snapshot()).unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load().unwrap(), snapshot());
        assert!(!reopened.temp_path().exists());
    }

    #[test]
    fn corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Serialization { .. }));
    }

    #[test]
    fn file_is_keyed_by_term() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        JsonFileStore::new(&path).flush(&snapshot()).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["tylenol"]["209387"], "Tylenol 500 MG Oral Tablet");
    }
}
