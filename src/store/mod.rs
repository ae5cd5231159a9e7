//! Persistence for the resolution cache.
//!
//! The cache is always read and written as one whole [`CacheSnapshot`]:
//!
//! - [`MemCacheStore`]: process-local, for tests and one-shot runs
//! - [`JsonFileStore`]: a single JSON document replaced atomically on flush
//! - [`DurableCacheStore`]: a redb table replaced in one write transaction
//!
//! [`open_store`] picks a backend from configuration.

pub mod durable;
pub mod json;
pub mod mem;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub use durable::DurableCacheStore;
pub use json::JsonFileStore;
pub use mem::MemCacheStore;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Identifier → display name for one resolved term.
pub type Resolution = BTreeMap<String, String>;

/// Normalized term → its resolution. The whole persisted state.
pub type CacheSnapshot = BTreeMap<String, Resolution>;

/// Backing store for the resolution cache.
///
/// `flush` replaces the stored snapshot as a unit; a reader never sees half of
/// a batch.
pub trait CacheStore: Send + Sync {
    /// Read the full snapshot. A store that was never written is empty.
    fn load(&self) -> StoreResult<CacheSnapshot>;

    /// Replace the stored snapshot.
    fn flush(&self, snapshot: &CacheSnapshot) -> StoreResult<()>;
}

/// Which backend holds the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    #[default]
    Json,
    Redb,
}

impl std::str::FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(CacheBackend::Memory),
            "json" => Ok(CacheBackend::Json),
            "redb" => Ok(CacheBackend::Redb),
            other => Err(format!("unknown cache backend \"{other}\" (memory, json, redb)")),
        }
    }
}

/// Open the configured backend at `path` (ignored for `Memory`).
pub fn open_store(backend: CacheBackend, path: &Path) -> StoreResult<Box<dyn CacheStore>> {
    Ok(match backend {
        CacheBackend::Memory => Box::new(MemCacheStore::new()),
        CacheBackend::Json => Box::new(JsonFileStore::new(path)),
        CacheBackend::Redb => Box::new(DurableCacheStore::open(path)?),
    })
}
