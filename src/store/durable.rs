//! ACID-durable cache store backed by redb.
//!
//! One row per normalized term, its resolution JSON-encoded. A flush drops and
//! refills the table inside a single write transaction, so readers see either
//! the old snapshot or the new one.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition, TableError};

use crate::error::StoreError;

use super::{CacheSnapshot, CacheStore, Resolution, StoreResult};

/// Normalized term → JSON-encoded [`Resolution`].
const RESOLUTIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("resolutions");

/// [`CacheStore`] using a redb database file.
pub struct DurableCacheStore {
    db: Arc<Database>,
}

impl DurableCacheStore {
    /// Open or create the database file at `path`.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Io { source: e })?;
            }
        }
        let db = Database::create(path).map_err(|e| StoreError::Redb {
            message: format!("failed to open redb at {}: {e}", path.display()),
        })?;
        Ok(Self { db: Arc::new(db) })
    }
}

impl CacheStore for DurableCacheStore {
    fn load(&self) -> StoreResult<CacheSnapshot> {
        let txn = self.db.begin_read().map_err(|e| StoreError::Redb {
            message: format!("begin_read failed: {e}"),
        })?;
        let table = match txn.open_table(RESOLUTIONS_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(CacheSnapshot::new()),
            Err(e) => {
                return Err(StoreError::Redb {
                    message: format!("open_table failed: {e}"),
                });
            }
        };

        let mut snapshot = CacheSnapshot::new();
        let rows = table.iter().map_err(|e| StoreError::Redb {
            message: format!("iter failed: {e}"),
        })?;
        for row in rows {
            let (term, encoded) = row.map_err(|e| StoreError::Redb {
                message: format!("read failed: {e}"),
            })?;
            let resolution: Resolution =
                serde_json::from_slice(encoded.value()).map_err(|e| StoreError::Serialization {
                    message: format!("bad entry for \"{}\": {e}", term.value()),
                })?;
            snapshot.insert(term.value().to_string(), resolution);
        }
        Ok(snapshot)
    }

    fn flush(&self, snapshot: &CacheSnapshot) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(|e| StoreError::Redb {
            message: format!("begin_write failed: {e}"),
        })?;
        txn.delete_table(RESOLUTIONS_TABLE)
            .map_err(|e| StoreError::Redb {
                message: format!("delete_table failed: {e}"),
            })?;
        {
            let mut table = txn.open_table(RESOLUTIONS_TABLE).map_err(|e| StoreError::Redb {
                message: format!("open_table failed: {e}"),
            })?;
            for (term, resolution) in snapshot {
                let encoded =
                    serde_json::to_vec(resolution).map_err(|e| StoreError::Serialization {
                        message: format!("failed to encode \"{term}\": {e}"),
                    })?;
                table
                    .insert(term.as_str(), encoded.as_slice())
                    .map_err(|e| StoreError::Redb {
                        message: format!("insert failed: {e}"),
                    })?;
            }
        }
        txn.commit().map_err(|e| StoreError::Redb {
            message: format!("commit failed: {e}"),
        })?;
        tracing::debug!(terms = snapshot.len(), "flushed resolution cache to redb");
        Ok(())
    }
}

impl std::fmt::Debug for DurableCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableCacheStore").finish()
    }
}
