//! Comparison verdict cache
//!
//! Verdicts are keyed by the normalized actor/action signature of both
//! events, never by event identity. Two pairs that differ only in target,
//! time, or location share one entry, and a hit is replayed under the
//! requesting pair's ids.

use once_cell::sync::Lazy;
use sakshya_core::{Event, Verdict};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Normalized `(actor_1, action_1, actor_2, action_2)` signature.
/// Order-sensitive: `(a, b)` and `(b, a)` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_pair(e1: &Event, e2: &Event) -> Self {
        Self(format!(
            "{}:{}|{}:{}",
            normalize(&e1.actor),
            normalize(&e1.action),
            normalize(&e2.actor),
            normalize(&e2.action)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Storage for comparison verdicts.
/// Implementations must be thread-safe (Send + Sync).
///
/// Writes are last-writer-wins replacements. Two comparators that miss on
/// the same key concurrently may both call the backend and both write.
pub trait ComparisonCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Verdict>;

    fn put(&self, key: CacheKey, verdict: Verdict);

    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hit/miss counters for a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

static SHARED_CACHE: Lazy<Arc<InMemoryComparisonCache>> =
    Lazy::new(|| Arc::new(InMemoryComparisonCache::new()));

/// Unbounded in-memory cache guarded by an RwLock. No eviction.
pub struct InMemoryComparisonCache {
    entries: RwLock<HashMap<CacheKey, Verdict>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryComparisonCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The process-wide instance. Entries live until the process exits or
    /// [`ComparisonCache::clear`] is called.
    pub fn shared() -> Arc<InMemoryComparisonCache> {
        Arc::clone(&SHARED_CACHE)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl Default for InMemoryComparisonCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonCache for InMemoryComparisonCache {
    fn get(&self, key: &CacheKey) -> Option<Verdict> {
        let found = self
            .entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned());
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    fn put(&self, key: CacheKey, verdict: Verdict) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, verdict);
        }
    }

    fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

impl std::fmt::Debug for InMemoryComparisonCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("InMemoryComparisonCache")
            .field("entries", &stats.entries)
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish()
    }
}
