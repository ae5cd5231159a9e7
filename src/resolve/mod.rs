//! Resolution cache: human-readable terms → canonical identifiers.
//!
//! Terms are normalized (trimmed, lower-cased) and looked up in a persisted
//! [`CacheSnapshot`]. Misses go to a [`Resolver`] and the new entries are
//! flushed to the [`CacheStore`] once per batch. The in-memory snapshot sits
//! behind a mutex held for the whole read-modify-write, so concurrent batches
//! cannot drop each other's updates.

pub mod rxnorm;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{ResolveError, StoreError};
use crate::store::{CacheSnapshot, CacheStore};

pub use crate::store::Resolution;
pub use rxnorm::RxNormClient;

/// Result type for resolution operations.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Upstream lookup used on a cache miss.
///
/// Implementations return [`ResolveError::UpstreamMissingData`] when the
/// service answered but had nothing usable for `term`; the cache skips such
/// terms. Any other error aborts the batch.
pub trait Resolver {
    fn resolve(&self, term: &str) -> ResolveResult<Resolution>;
}

impl<F> Resolver for F
where
    F: Fn(&str) -> ResolveResult<Resolution>,
{
    fn resolve(&self, term: &str) -> ResolveResult<Resolution> {
        self(term)
    }
}

/// Trim and lower-case a term.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Split a comma-separated batch into distinct normalized terms, keeping
/// first-seen order and dropping blanks.
pub fn split_terms(input: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in input.split(',').map(normalize_term) {
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Outcome of a batch resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResolution {
    /// Union of every resolved term's mapping.
    pub resolved: Resolution,
    /// Per normalized term, for terms that resolved.
    pub terms: BTreeMap<String, Resolution>,
    /// Terms served from the cache.
    pub hits: Vec<String>,
    /// Terms fetched upstream during this batch.
    pub fetched: Vec<String>,
    /// Terms the upstream had no data for.
    pub skipped: Vec<String>,
}

/// Persistent term → identifier cache.
pub struct ResolutionCache {
    store: Box<dyn CacheStore>,
    entries: Mutex<CacheSnapshot>,
}

impl ResolutionCache {
    /// Load the cache from `store`.
    pub fn open(store: impl CacheStore + 'static) -> ResolveResult<Self> {
        Self::open_boxed(Box::new(store))
    }

    /// Load the cache from an already boxed store.
    pub fn open_boxed(store: Box<dyn CacheStore>) -> ResolveResult<Self> {
        let entries = store.load()?;
        tracing::debug!(terms = entries.len(), "loaded resolution cache");
        Ok(Self {
            store,
            entries: Mutex::new(entries),
        })
    }

    fn lock(&self) -> ResolveResult<MutexGuard<'_, CacheSnapshot>> {
        self.entries
            .lock()
            .map_err(|_| ResolveError::Store(StoreError::Poisoned))
    }

    /// Resolve one term.
    ///
    /// Input containing commas is split like a batch and each part is looked up
    /// and cached on its own; the returned mapping is their union. Blank input is
    /// [`ResolveError::InvalidInput`]. A term the upstream has no data for yields
    /// an empty mapping and is not cached.
    pub fn resolve_term<R>(&self, term: &str, resolver: &R) -> ResolveResult<Resolution>
    where
        R: Resolver + ?Sized,
    {
        let terms = split_terms(term);
        if terms.is_empty() {
            return Err(ResolveError::InvalidInput { count: 0 });
        }
        let mut entries = self.lock()?;
        let batch = self.resolve_locked(&mut entries, &terms, resolver)?;
        Ok(batch.resolved)
    }

    /// Resolve a comma-separated batch of at least two distinct terms.
    pub fn resolve_batch<R>(&self, input: &str, resolver: &R) -> ResolveResult<BatchResolution>
    where
        R: Resolver + ?Sized,
    {
        let terms = split_terms(input);
        if terms.len() < 2 {
            return Err(ResolveError::InvalidInput { count: terms.len() });
        }
        let mut entries = self.lock()?;
        self.resolve_locked(&mut entries, &terms, resolver)
    }

    fn resolve_locked<R>(
        &self,
        entries: &mut CacheSnapshot,
        terms: &[String],
        resolver: &R,
    ) -> ResolveResult<BatchResolution>
    where
        R: Resolver + ?Sized,
    {
        let mut batch = BatchResolution::default();
        let mut fresh = CacheSnapshot::new();

        for term in terms {
            if let Some(hit) = entries.get(term).or_else(|| fresh.get(term)) {
                tracing::debug!(term = %term, "resolution cache hit");
                batch.terms.insert(term.clone(), hit.clone());
                batch.hits.push(term.clone());
                continue;
            }
            match resolver.resolve(term) {
                Ok(resolution) => {
                    batch.terms.insert(term.clone(), resolution.clone());
                    batch.fetched.push(term.clone());
                    fresh.insert(term.clone(), resolution);
                }
                Err(ResolveError::UpstreamMissingData { field, .. }) => {
                    tracing::warn!(term = %term, missing = %field, "skipping unresolvable term");
                    batch.skipped.push(term.clone());
                }
                Err(e) => return Err(e),
            }
        }

        if !fresh.is_empty() {
            let mut next = entries.clone();
            next.extend(fresh);
            self.store.flush(&next)?;
            tracing::info!(
                fetched = batch.fetched.len(),
                total = next.len(),
                "persisted resolution cache"
            );
            *entries = next;
        }

        for resolution in batch.terms.values() {
            batch
                .resolved
                .extend(resolution.iter().map(|(id, name)| (id.clone(), name.clone())));
        }
        Ok(batch)
    }

    /// Drop a term so the next lookup goes upstream. Returns whether it was cached.
    pub fn invalidate(&self, term: &str) -> ResolveResult<bool> {
        let term = normalize_term(term);
        let mut entries = self.lock()?;
        if !entries.contains_key(&term) {
            return Ok(false);
        }
        let mut next = entries.clone();
        next.remove(&term);
        self.store.flush(&next)?;
        *entries = next;
        tracing::info!(term = %term, "invalidated cached resolution");
        Ok(true)
    }

    /// Replace the in-memory snapshot with what the store currently holds.
    pub fn reload(&self) -> ResolveResult<()> {
        let mut entries = self.lock()?;
        *entries = self.store.load()?;
        Ok(())
    }

    /// Write the in-memory snapshot to the store.
    pub fn flush(&self) -> ResolveResult<()> {
        let entries = self.lock()?;
        self.store.flush(&entries)?;
        Ok(())
    }

    /// Cached mapping for `term`, without going upstream.
    pub fn get(&self, term: &str) -> ResolveResult<Option<Resolution>> {
        let entries = self.lock()?;
        Ok(entries.get(&normalize_term(term)).cloned())
    }

    /// Number of cached terms.
    pub fn len(&self) -> ResolveResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> ResolveResult<bool> {
        Ok(self.lock()?.is_empty())
    }
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemCacheStore;
    use std::cell::{Cell, RefCell};
    use std::sync::Arc;

    fn lookup(term: &str) -> ResolveResult<Resolution> {
        match term {
            "tylenol" => Ok(Resolution::from([
                ("202433".to_string(), "Tylenol 325 MG".to_string()),
                ("209387".to_string(), "Tylenol 500 MG".to_string()),
            ])),
            "zocor" => Ok(Resolution::from([(
                "196503".to_string(),
                "Zocor 40 MG".to_string(),
            )])),
            "diflucan" => Ok(Resolution::from([(
                "207106".to_string(),
                "Diflucan 50 MG".to_string(),
            )])),
            other => Err(ResolveError::UpstreamMissingData {
                term: other.to_string(),
                field: "conceptProperties".into(),
            }),
        }
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_term("  Warfarin \n"), "warfarin");
    }

    #[test]
    fn split_dedupes_and_drops_blanks() {
        assert_eq!(
            split_terms("Tylenol, Zocor,, tylenol ,Diflucan"),
            vec!["tylenol", "zocor", "diflucan"]
        );
        assert!(split_terms(" , ").is_empty());
    }

    #[test]
    fn second_lookup_is_a_pure_hit() {
        let calls = Cell::new(0);
        let counting = |term: &str| {
            calls.set(calls.get() + 1);
            lookup(term)
        };
        let store = Arc::new(MemCacheStore::new());
        let cache = ResolutionCache::open(Arc::clone(&store)).unwrap();

        let first = cache.resolve_term("Tylenol", &counting).unwrap();
        let second = cache.resolve_term(" tylenol ", &counting).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
        assert_eq!(calls.get(), 1);
        assert_eq!(store.flush_count(), 1);
    }

    #[test]
    fn single_lookup_splits_comma_input_into_terms() {
        let seen = RefCell::new(Vec::new());
        let recording = |term: &str| {
            seen.borrow_mut().push(term.to_string());
            lookup(term)
        };
        let store = Arc::new(MemCacheStore::new());
        let cache = ResolutionCache::open(Arc::clone(&store)).unwrap();

        let resolved = cache.resolve_term("Tylenol, Zocor", &recording).unwrap();

        assert_eq!(*seen.borrow(), vec!["tylenol", "zocor"]);
        assert_eq!(resolved.len(), 3);
        let keys: Vec<String> = store.load().unwrap().into_keys().collect();
        assert_eq!(keys, vec!["tylenol", "zocor"]);
        assert!(cache.get("tylenol, zocor").unwrap().is_none());
    }

    #[test]
    fn blank_lookup_is_rejected_without_going_upstream() {
        let calls = Cell::new(0);
        let counting = |term: &str| {
            calls.set(calls.get() + 1);
            lookup(term)
        };
        let store = Arc::new(MemCacheStore::new());
        let cache = ResolutionCache::open(Arc::clone(&store)).unwrap();

        for blank in ["", "   ", " , "] {
            let err = cache.resolve_term(blank, &counting).unwrap_err();
            assert!(matches!(err, ResolveError::InvalidInput { count: 0 }));
        }
        assert_eq!(calls.get(), 0);
        assert_eq!(store.flush_count(), 0);
        assert!(cache.get("").unwrap().is_none());
    }

    #[test]
    fn batch_writes_once() {
        let store = Arc::new(MemCacheStore::new());
        let cache = ResolutionCache::open(Arc::clone(&store)).unwrap();

        let batch = cache.resolve_batch("Tylenol, Zocor, Diflucan", &lookup).unwrap();
        assert_eq!(batch.fetched.len(), 3);
        assert_eq!(batch.resolved.len(), 4);
        assert_eq!(store.flush_count(), 1);
        assert_eq!(store.load().unwrap().len(), 3);

        let again = cache.resolve_batch("zocor, diflucan", &lookup).unwrap();
        assert_eq!(again.hits, vec!["zocor", "diflucan"]);
        assert_eq!(store.flush_count(), 1);
    }

    #[test]
    fn batch_needs_two_distinct_terms() {
        let cache = ResolutionCache::open(MemCacheStore::new()).unwrap();
        let err = cache.resolve_batch("Tylenol, tylenol", &lookup).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidInput { count: 1 }));
        let err = cache.resolve_batch("", &lookup).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidInput { count: 0 }));
    }

    #[test]
    fn missing_upstream_data_skips_term() {
        let store = Arc::new(MemCacheStore::new());
        let cache = ResolutionCache::open(Arc::clone(&store)).unwrap();
        let batch = cache.resolve_batch("tylenol, notadrug", &lookup).unwrap();

        assert_eq!(batch.skipped, vec!["notadrug"]);
        assert_eq!(batch.fetched, vec!["tylenol"]);
        assert!(cache.get("notadrug").unwrap().is_none());
        assert!(cache.resolve_term("notadrug", &lookup).unwrap().is_empty());
    }

    #[test]
    fn upstream_failure_aborts_without_writing() {
        let failing = |term: &str| -> ResolveResult<Resolution> {
            if term == "zocor" {
                Err(ResolveError::Upstream {
                    term: term.into(),
                    message: "connection refused".into(),
                })
            } else {
                lookup(term)
            }
        };
        let store = Arc::new(MemCacheStore::new());
        let cache = ResolutionCache::open(Arc::clone(&store)).unwrap();

        let err = cache.resolve_batch("tylenol, zocor", &failing).unwrap_err();
        assert!(matches!(err, ResolveError::Upstream { .. }));
        assert_eq!(store.flush_count(), 0);
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn invalidate_forces_refetch() {
        let calls = Cell::new(0);
        let counting = |term: &str| {
            calls.set(calls.get() + 1);
            lookup(term)
        };
        let cache = ResolutionCache::open(MemCacheStore::new()).unwrap();
        cache.resolve_term("zocor", &counting).unwrap();

        assert!(cache.invalidate("ZOCOR").unwrap());
        assert!(!cache.invalidate("zocor").unwrap());
        cache.resolve_term("zocor", &counting).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn open_reads_existing_snapshot() {
        let mut snapshot = CacheSnapshot::new();
        snapshot.insert(
            "warfarin".into(),
            Resolution::from([("11289".to_string(), "warfarin".to_string())]),
        );
        let cache = ResolutionCache::open(MemCacheStore::with_snapshot(snapshot)).unwrap();
        let never = |_: &str| -> ResolveResult<Resolution> { panic!("should hit cache") };
        let resolved = cache.resolve_term("Warfarin", &never).unwrap();
        assert_eq!(resolved["11289"], "warfarin");
    }

    #[test]
    fn concurrent_batches_keep_every_term() {
        let store = Arc::new(MemCacheStore::new());
        let cache = Arc::new(ResolutionCache::open(Arc::clone(&store)).unwrap());
        let echo = |term: &str| -> ResolveResult<Resolution> {
            Ok(Resolution::from([(format!("{term}-id"), term.to_string())]))
        };

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache
                        .resolve_batch(&format!("drug-{i}-a, drug-{i}-b"), &echo)
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.load().unwrap().len(), 16);
        assert_eq!(store.flush_count(), 8);
    }
}
