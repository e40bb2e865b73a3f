//! Cache Statistics Module
//!
//! Debug counters for cache activity: writes, reads, clones, deletions and
//! cleanup passes.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Writes that created a new entry
    pub inserts: u64,
    /// Writes that overwrote an existing entry
    pub updates: u64,
    /// Reads that returned a value
    pub hits: u64,
    /// Reads of absent or expired keys
    pub misses: u64,
    /// Deep copies made on read or write
    pub clones: u64,
    /// Entries removed for any reason
    pub deletes: u64,
    /// Entries removed to stay within capacity
    pub evictions: u64,
    /// Entries removed because their time ran out
    pub expirations: u64,
    /// Entries removed by idle eviction
    pub idle_evictions: u64,
    /// Cleanup passes over a non-empty cache
    pub cleanups: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_insert(&mut self) {
        self.inserts += 1;
    }

    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_clone(&mut self) {
        self.clones += 1;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub fn record_idle_eviction(&mut self) {
        self.idle_evictions += 1;
    }

    pub fn record_cleanup(&mut self) {
        self.cleanups += 1;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_removal_counters() {
        let mut stats = CacheStats::new();
        stats.record_eviction();
        stats.record_expiration();
        stats.record_expiration();
        stats.record_idle_eviction();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 2);
        assert_eq!(stats.idle_evictions, 1);
    }

    #[test]
    fn test_serializes_to_json() {
        let mut stats = CacheStats::new();
        stats.record_insert();
        stats.set_total_entries(1);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["inserts"], 1);
        assert_eq!(json["total_entries"], 1);
    }
}
