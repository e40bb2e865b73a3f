//! Cache Store Module
//!
//! Synchronous cache engine: HashMap storage, insertion-order capacity
//! eviction, lazy expiration on read and the cleanup sweep. Keys reaching the
//! store are already normalized.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, KeyOrder, IDLE_THRESHOLD};
use crate::config::{CacheConfig, Expiry};

// == Cleanup Report ==
/// Outcome of one cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Entries dropped for outliving their expiration
    pub expired: usize,
    /// Entries dropped by idle eviction
    pub idle: usize,
    /// Entries kept, with their access counters reset
    pub retained: usize,
}

impl CleanupReport {
    /// Total number of entries removed.
    pub fn removed(&self) -> usize {
        self.expired + self.idle
    }
}

enum Sweep {
    Expired,
    Idle,
    Retained,
}

// == Cache Store ==
/// Cache storage with expiration, capacity eviction and idle cleanup.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion order of the stored keys
    order: KeyOrder,
    /// Activity counters
    stats: CacheStats,
    /// Construction parameters
    config: CacheConfig,
    /// Whether a cleanup pass is scheduled for this store
    armed: bool,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            order: KeyOrder::new(),
            stats: CacheStats::new(),
            config,
            armed: false,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Stores a value at `now`.
    ///
    /// A new key evicts the oldest key first when the store is at capacity.
    /// An existing key keeps its position and access counter, and an update
    /// asking to never expire falls back to the cache default.
    ///
    /// # Arguments
    /// * `key` - Normalized key
    /// * `value` - The value to store
    /// * `expiry` - Time-to-live for this write
    /// * `now` - Write time
    pub fn set_at(&mut self, key: String, value: V, expiry: Expiry, now: Instant) {
        if let Some(entry) = self.entries.get_mut(&key) {
            let expiry = match expiry {
                Expiry::Never => Expiry::Default,
                other => other,
            };
            debug!("Update cache key: {}", key);
            entry.refresh_at(value, expiry.resolve(self.config.max_duration), now);
            self.stats.record_update();
            return;
        }

        if let Some(max_length) = self.config.max_length {
            if self.order.len() >= max_length {
                if let Some(oldest) = self.order.oldest().cloned() {
                    debug!("Evict oldest cache key: {}", oldest);
                    self.delete(&oldest);
                    self.stats.record_eviction();
                }
            }
        }

        let ttl = expiry.resolve(self.config.max_duration);
        debug!("Set cache key: {}", key);
        self.entries
            .insert(key.clone(), CacheEntry::new_at(value, ttl, now));
        self.order.push(key);
        self.stats.record_insert();
    }

    /// Stores a value now.
    pub fn set(&mut self, key: String, value: V, expiry: Expiry) {
        self.set_at(key, value, expiry, Instant::now());
    }

    // == Get ==
    /// Reads a value at `now`.
    ///
    /// Expired entries are deleted and read as absent unless `force` is set.
    pub fn get_at(&mut self, key: &str, force: bool, now: Instant) -> Option<&V> {
        let valid = match self.entries.get(key) {
            Some(entry) => force || entry.is_valid_at(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if !valid {
            debug!("Expired cache key: {}", key);
            self.delete(key);
            self.stats.record_expiration();
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.touch();
        self.stats.record_hit();
        Some(&entry.value)
    }

    /// Reads a value now.
    pub fn get(&mut self, key: &str, force: bool) -> Option<&V> {
        self.get_at(key, force, Instant::now())
    }

    // == Delete ==
    /// Removes an entry, returning its value. Absent keys are ignored.
    pub fn delete(&mut self, key: &str) -> Option<V> {
        let entry = self.entries.remove(key)?;
        self.order.remove(key);
        self.stats.record_delete();
        debug!("Delete cache key: {}", key);
        Some(entry.value)
    }

    // == Reset ==
    /// Drops every entry.
    pub fn reset(&mut self) {
        debug!("Clear cache ({} entries)", self.entries.len());
        self.entries = HashMap::new();
        self.order.clear();
    }

    // == Cleanup ==
    /// Sweeps the store at `now`.
    ///
    /// Entries past their expiration are removed. With auto-cleanup enabled,
    /// entries that were not read since the previous pass are removed as well
    /// once they are older than the idle threshold, or unconditionally when
    /// `force` is set. Every retained entry starts a new access window.
    pub fn cleanup_at(&mut self, now: Instant, force: bool) -> CleanupReport {
        let mut report = CleanupReport::default();
        if self.order.is_empty() {
            return report;
        }

        self.stats.record_cleanup();
        let auto_cleanup = self.config.auto_cleanup;
        let keys: Vec<String> = self.order.iter().cloned().collect();

        for key in keys {
            let verdict = match self.entries.get_mut(&key) {
                Some(entry) if entry.is_stale_at(now) => Sweep::Expired,
                Some(entry)
                    if auto_cleanup
                        && entry.access_count == 0
                        && (force || entry.age_at(now) > IDLE_THRESHOLD) =>
                {
                    Sweep::Idle
                }
                Some(entry) => {
                    entry.access_count = 0;
                    Sweep::Retained
                }
                None => continue,
            };

            match verdict {
                Sweep::Expired => {
                    self.delete(&key);
                    self.stats.record_expiration();
                    report.expired += 1;
                }
                Sweep::Idle => {
                    self.delete(&key);
                    self.stats.record_idle_eviction();
                    report.idle += 1;
                }
                Sweep::Retained => report.retained += 1,
            }
        }

        report
    }

    /// Sweeps the store now.
    pub fn cleanup(&mut self, force: bool) -> CleanupReport {
        self.cleanup_at(Instant::now(), force)
    }

    // == Inspection ==
    /// Returns true if the key is stored, expired or not.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the entry for a key without counting a read.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    /// Copies every entry, oldest insertion first.
    pub fn entries(&self) -> IndexMap<String, CacheEntry<V>>
    where
        V: Clone,
    {
        self.order
            .iter()
            .filter_map(|key| {
                self.entries
                    .get(key)
                    .map(|entry| (key.clone(), entry.clone()))
            })
            .collect()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.order.len());
        stats
    }

    pub(crate) fn record_clone(&mut self) {
        self.stats.record_clone();
    }

    // == Scheduling Flag ==
    /// Whether a cleanup pass is scheduled.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub(crate) fn set_armed(&mut self, armed: bool) {
        self.armed = armed;
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
