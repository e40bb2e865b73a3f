//! Cache Registry
//!
//! Opt-in introspection over a set of caches. Nothing is registered
//! implicitly; the owner decides which caches to track.

use serde::Serialize;

use crate::cache::{Cache, CacheStats, WeakCache};
use crate::value::Value;

/// Point-in-time view of one registered cache.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub id: u64,
    pub entries: usize,
    pub scheduled: bool,
    pub stats: CacheStats,
}

// == Cache Registry ==
/// Weak references to caches for debugging and statistics.
pub struct CacheRegistry<V = Value> {
    caches: Vec<WeakCache<V>>,
}

impl<V> CacheRegistry<V> {
    pub fn new() -> Self {
        Self { caches: Vec::new() }
    }

    /// Tracks a cache without keeping it alive.
    pub fn register(&mut self, cache: &Cache<V>) {
        self.caches.push(cache.downgrade());
    }

    /// Snapshots every live cache and forgets dropped ones.
    pub fn snapshots(&mut self) -> Vec<CacheSnapshot> {
        let mut snapshots = Vec::with_capacity(self.caches.len());
        self.caches.retain(|weak| match weak.upgrade() {
            Some(cache) => {
                snapshots.push(CacheSnapshot {
                    id: cache.id(),
                    entries: cache.len(),
                    scheduled: cache.is_scheduled(),
                    stats: cache.stats(),
                });
                true
            }
            None => false,
        });
        snapshots
    }

    /// Number of registered caches that are still alive.
    pub fn len(&self) -> usize {
        self.caches
            .iter()
            .filter(|weak| weak.upgrade().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Default for CacheRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_snapshot() {
        let mut registry = CacheRegistry::new();
        let a: Cache = Cache::default();
        let b: Cache = Cache::default();
        registry.register(&a);
        registry.register(&b);

        a.set("foo", Value::from("bar"));

        let snapshots = registry.snapshots();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].id, a.id());
        assert_eq!(snapshots[0].entries, 1);
        assert_eq!(snapshots[0].stats.inserts, 1);
        assert_eq!(snapshots[1].entries, 0);
    }

    #[test]
    fn test_dropped_caches_are_pruned() {
        let mut registry = CacheRegistry::new();
        let kept: Cache = Cache::default();
        {
            let dropped: Cache = Cache::default();
            registry.register(&dropped);
        }
        registry.register(&kept);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshots().len(), 1);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_registry_does_not_keep_caches_alive() {
        let mut registry = CacheRegistry::new();
        let cache: Cache = Cache::default();
        let weak = cache.downgrade();
        registry.register(&cache);

        drop(cache);

        assert!(weak.upgrade().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut registry = CacheRegistry::new();
        let cache: Cache = Cache::default();
        registry.register(&cache);

        let json = serde_json::to_value(registry.snapshots()).unwrap();
        assert_eq!(json[0]["entries"], 0);
        assert!(json[0]["stats"].is_object());
    }
}
