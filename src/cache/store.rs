//! Cache Store Module
//!
//! In-memory keyed store of time-stamped entries with per-entry TTL.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, LruTracker, SystemClock, DEFAULT_TTL_MS};

/// Cache store shared between the orchestrator, the invalidator and callers.
pub type SharedCache<V> = Arc<RwLock<CacheStore<V>>>;

// == Cache Store ==
/// Keyed TTL cache.
///
/// Entries are never swept in the background: validity is checked on read
/// and expired entries stay readable through [`CacheStore::get_cache`] until
/// they are overwritten or removed. The store is unbounded unless
/// [`CacheStore::with_max_entries`] opts into LRU eviction.
#[derive(Debug)]
pub struct CacheStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
    stats: CacheStats,
    /// TTL in milliseconds applied when the caller does not give one
    default_ttl: u64,
    /// Capacity and recency tracking, only in bounded mode
    bound: Option<(usize, LruTracker)>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates an unbounded store on the wall clock.
    ///
    /// # Arguments
    /// * `default_ttl` - Default TTL in milliseconds
    pub fn new(default_ttl: u64) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Creates an unbounded store reading time from `clock`.
    pub fn with_clock(default_ttl: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
            bound: None,
            clock,
        }
    }

    /// Caps the store at `max_entries`, evicting the least recently used
    /// key when a new key is inserted at capacity.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        let mut lru = LruTracker::new();
        for key in self.entries.keys() {
            lru.touch(key);
        }
        self.bound = Some((max_entries.max(1), lru));
        self
    }

    /// Wraps the store for sharing.
    pub fn shared(self) -> SharedCache<V> {
        Arc::new(RwLock::new(self))
    }

    // == Set ==
    /// Inserts or overwrites the entry for `key`, stamping it with the
    /// current time.
    ///
    /// # Arguments
    /// * `key` - Cache key
    /// * `data` - Payload to store
    /// * `ttl` - TTL in milliseconds, the store default if `None`
    pub fn set_cache(&mut self, key: impl Into<String>, data: V, ttl: Option<u64>) {
        let key = key.into();
        let now = self.clock.now_ms();
        let ttl = ttl.unwrap_or(self.default_ttl);

        if let Some((max_entries, lru)) = self.bound.as_mut() {
            if !self.entries.contains_key(&key) && self.entries.len() >= *max_entries {
                if let Some(evicted) = lru.evict_oldest() {
                    debug!(key = %evicted, "Evicting least recently used cache entry");
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
            }
            lru.touch(&key);
        }

        self.entries.insert(key, CacheEntry::new(data, now, ttl));
    }

    // == Get ==
    /// Returns the payload for `key` if an entry exists.
    ///
    /// Validity is NOT checked; callers that need fresh data check
    /// [`CacheStore::is_valid_cache`] first, or use [`CacheStore::get_valid`].
    pub fn get_cache(&self, key: &str) -> Option<V> {
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    // == Is Valid ==
    /// False if there is no entry or if it has outlived its TTL.
    pub fn is_valid_cache(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .map(|entry| entry.is_valid(now))
            .unwrap_or(false)
    }

    // == Get Valid ==
    /// Validity check and read in one step.
    ///
    /// Records a hit or a miss and refreshes recency in bounded mode.
    pub fn get_valid(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        match self.entries.get(key) {
            Some(entry) if entry.is_valid(now) => {
                let data = entry.data.clone();
                self.stats.record_hit();
                if let Some((_, lru)) = self.bound.as_mut() {
                    lru.touch(key);
                }
                Some(data)
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Full entry for `key`, expired or not.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // == Remove ==
    /// Removes the entry for `key`, returning whether one existed.
    pub fn remove_cache(&mut self, key: &str) -> bool {
        if let Some((_, lru)) = self.bound.as_mut() {
            lru.remove(key);
        }
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.stats.record_invalidation();
        }
        removed
    }

    // == Clear ==
    pub fn clear_cache(&mut self) {
        self.entries.clear();
        if let Some((_, lru)) = self.bound.as_mut() {
            lru.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_MS)
    }
}
