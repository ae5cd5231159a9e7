//! In-memory cache store.
//!
//! Holds the snapshot behind a mutex and counts flushes so callers can check
//! how often the cache would have hit disk. All data is lost on process exit.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::StoreError;

use super::{CacheSnapshot, CacheStore, StoreResult};

/// Process-local [`CacheStore`].
#[derive(Debug, Default)]
pub struct MemCacheStore {
    data: Mutex<CacheSnapshot>,
    flushes: AtomicUsize,
}

impl MemCacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `snapshot`.
    pub fn with_snapshot(snapshot: CacheSnapshot) -> Self {
        Self {
            data: Mutex::new(snapshot),
            flushes: AtomicUsize::new(0),
        }
    }

    /// Number of successful `flush` calls so far.
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::Relaxed)
    }
}

impl CacheStore for MemCacheStore {
    fn load(&self) -> StoreResult<CacheSnapshot> {
        let data = self.data.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(data.clone())
    }

    fn flush(&self, snapshot: &CacheSnapshot) -> StoreResult<()> {
        let mut data = self.data.lock().map_err(|_| StoreError::Poisoned)?;
        *data = snapshot.clone();
        self.flushes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl CacheStore for std::sync::Arc<MemCacheStore> {
    fn load(&self) -> StoreResult<CacheSnapshot> {
        self.as_ref().load()
    }

    fn flush(&self, snapshot: &CacheSnapshot) -> StoreResult<()> {
        self.as_ref().flush(snapshot)
    }
}
