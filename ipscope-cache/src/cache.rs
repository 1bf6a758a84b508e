//! In-memory TTL cache for lookup results.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ipscope_core::clock::{Clock, SystemClock};
use ipscope_core::constants::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_SWEEP_SECS, DEFAULT_CACHE_TTL_SECS,
};
use ipscope_core::types::{LookupKey, ResultRecord};

/// Cache entry with its insertion time.
#[derive(Clone)]
struct CacheEntry {
    record: Arc<ResultRecord>,
    inserted_at: Instant,
}

impl CacheEntry {
    /// Visible only while `now < inserted_at + ttl`.
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) >= ttl
    }
}

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// Entry time-to-live in seconds
    pub ttl_seconds: u64,
    /// Interval between active sweeps of expired entries, in seconds
    pub sweep_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            ttl_seconds: DEFAULT_CACHE_TTL_SECS,
            sweep_interval_seconds: DEFAULT_CACHE_SWEEP_SECS,
        }
    }
}

impl CacheConfig {
    /// Entry time-to-live.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Interval between active sweeps.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

/// In-memory cache for lookup results.
///
/// Safe for concurrent use. Concurrent writes to the same key are last
/// writer wins; an expired entry is absent whether or not it has been
/// swept yet.
pub struct ResultCache {
    entries: RwLock<HashMap<LookupKey, CacheEntry>>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    /// Creates a new cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock::shared())
    }

    /// Creates a cache reading time from the given clock.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            clock,
        }
    }

    /// Returns the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Gets a cached record.
    ///
    /// Returns None if never inserted or expired.
    pub fn get(&self, key: &LookupKey) -> Option<Arc<ResultRecord>> {
        let now = self.clock.now();
        let ttl = self.config.ttl();

        let entries = self.entries.read();

        if let Some(entry) = entries.get(key) {
            if !entry.is_expired(now, ttl) {
                return Some(Arc::clone(&entry.record));
            }
        }

        None
    }

    /// Stores a record, replacing any previous entry and resetting its age.
    pub fn put(&self, key: LookupKey, record: Arc<ResultRecord>) {
        let now = self.clock.now();
        let ttl = self.config.ttl();

        let mut entries = self.entries.write();

        // At capacity: drop expired entries first
        if entries.len() >= self.config.max_entries && !entries.contains_key(&key) {
            entries.retain(|_, entry| !entry.is_expired(now, ttl));
        }

        // Still at capacity? Remove oldest entry
        if entries.len() >= self.config.max_entries && !entries.contains_key(&key) {
            if let Some(oldest_key) = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone())
            {
                debug!(key = %oldest_key, "Evicting oldest cache entry");
                entries.remove(&oldest_key);
            }
        }

        entries.insert(key, CacheEntry {
            record,
            inserted_at: now,
        });
    }

    /// Removes a cached entry.
    pub fn remove(&self, key: &LookupKey) {
        self.entries.write().remove(key);
    }

    /// Clears all cached entries regardless of remaining TTL.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let ttl = self.config.ttl();

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, ttl));
        before - entries.len()
    }

    /// Returns the number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let ttl = self.config.ttl();

        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired(now, ttl)).count();

        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len() - expired,
            capacity: self.config.max_entries,
            ttl_seconds: self.config.ttl_seconds,
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Clone, Debug, Serialize)]
pub struct CacheStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Expired entries not yet swept
    pub expired_entries: usize,
    /// Valid (non-expired) entries
    pub valid_entries: usize,
    /// Maximum capacity
    pub capacity: usize,
    /// Configured time-to-live
    pub ttl_seconds: u64,
}
