//! Cache Handle Module
//!
//! The public cache type: a cloneable handle around the store that also owns
//! the cache's cleanup schedule.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::cache::{normalize_key, CacheEntry, CacheKey, CacheStats, CacheStore, CleanupReport};
use crate::config::{CacheConfig, Expiry, Limit};
use crate::error::{CacheError, Result};
use crate::tasks::{arm_cleanup, cleanup_identifier, DebounceScheduler};
use crate::value::{DeepClone, Value};

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(0);

struct Inner<V> {
    id: u64,
    cleanup_id: String,
    store: Mutex<CacheStore<V>>,
    scheduler: DebounceScheduler,
}

impl<V> Drop for Inner<V> {
    fn drop(&mut self) {
        if self.scheduler.cancel(&self.cleanup_id) {
            debug!("Cache@{} dropped, pending cleanup cancelled", self.id);
        }
    }
}

// == Cache ==
/// An in-memory cache with expiration, capacity eviction and idle cleanup.
///
/// Cloning the handle shares the same cache. The first write arms a
/// recurring cleanup pass on the tokio runtime; the schedule disarms itself
/// once the cache is empty and is cancelled when the last handle is dropped.
/// Outside a runtime, expired entries are still dropped lazily on read and by
/// explicit [`Cache::cleanup`] calls.
///
/// # Example
/// ```
/// use flexicache::{Cache, Expiry, Limit, Value};
///
/// let cache: Cache = Cache::create(Expiry::Never, Limit::Max(2), false);
/// cache.set("a", Value::from("a"));
/// cache.set("b", Value::from("b"));
/// cache.set("c", Value::from("c"));
///
/// assert!(cache.get("a").is_none());
/// assert_eq!(cache.get("c"), Some(Value::from("c")));
/// ```
pub struct Cache<V = Value> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("id", &self.inner.id)
            .field("len", &self.len())
            .finish()
    }
}

impl<V> Cache<V> {
    fn store(&self) -> MutexGuard<'_, CacheStore<V>> {
        self.inner
            .store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Unique id of this cache within the process.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn config(&self) -> CacheConfig {
        self.store().config().clone()
    }

    /// Returns true if a cleanup pass is pending for this cache.
    pub fn is_scheduled(&self) -> bool {
        self.inner.scheduler.is_pending(&self.inner.cleanup_id)
    }

    pub(crate) fn scheduler(&self) -> &DebounceScheduler {
        &self.inner.scheduler
    }

    /// Returns a handle that does not keep the cache alive.
    pub fn downgrade(&self) -> WeakCache<V> {
        WeakCache {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // == Delete ==
    /// Removes a key. Absent and empty keys are ignored.
    pub fn delete<K: CacheKey>(&self, key: K) {
        if let Some(key) = normalize_key(&key) {
            self.store().delete(&key);
        }
    }

    /// Alias for [`Cache::delete`].
    pub fn del<K: CacheKey>(&self, key: K) {
        self.delete(key)
    }

    // == Remove ==
    /// Removes a key and returns its value.
    ///
    /// The value is returned even if the entry has expired but was not yet
    /// swept.
    ///
    /// # Errors
    /// `CacheError::MissingKey` if the key is not stored.
    pub fn remove<K: CacheKey>(&self, key: K) -> Result<V> {
        let key = key.to_key();
        self.store()
            .delete(&key)
            .ok_or(CacheError::MissingKey(key))
    }

    /// Alias for [`Cache::remove`].
    pub fn rm<K: CacheKey>(&self, key: K) -> Result<V> {
        self.remove(key)
    }

    // == Bulk ==
    /// Drops every entry at once.
    pub fn reset(&self) {
        debug!("Clear cache@{}", self.inner.id);
        self.store().reset();
    }

    /// Number of stored entries.
    pub fn count(&self) -> usize {
        self.store().len()
    }

    pub fn len(&self) -> usize {
        self.count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.store().stats()
    }

    /// Copies the entry table (values and metadata), oldest insertion first.
    ///
    /// For [`Value`] payloads the copies share their containers with the
    /// stored values.
    pub fn all(&self) -> IndexMap<String, CacheEntry<V>>
    where
        V: Clone,
    {
        debug!("Get all from cache@{}", self.inner.id);
        self.store().entries()
    }
}

impl<V: Clone + Send + 'static> Cache<V> {
    // == Constructor ==
    /// Creates a cache with its own scheduler.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_scheduler(config, DebounceScheduler::new())
    }

    /// Creates a cache from the three construction arguments.
    ///
    /// # Arguments
    /// * `max_duration` - Default TTL; `Default` is 180 seconds, `Never` disables
    /// * `max_length` - Capacity; `Default` is 1000 entries, `Unbounded` disables
    /// * `auto_cleanup` - Evict entries that nobody reads
    pub fn create(max_duration: Expiry, max_length: Limit, auto_cleanup: bool) -> Self {
        Self::new(CacheConfig::new(max_duration, max_length, auto_cleanup))
    }

    /// Creates a cache whose cleanup passes run on a shared scheduler.
    pub fn with_scheduler(config: CacheConfig, scheduler: DebounceScheduler) -> Self {
        let id = NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed);
        debug!("Initialize cache@{} with {:?}", id, config);

        Self {
            inner: Arc::new(Inner {
                id,
                cleanup_id: cleanup_identifier(id),
                store: Mutex::new(CacheStore::new(config)),
                scheduler,
            }),
        }
    }

    // == Set ==
    /// Stores a value under the default expiration.
    ///
    /// Returns the value, or None for an empty key (nothing is stored).
    pub fn set<K: CacheKey>(&self, key: K, value: V) -> Option<V> {
        self.set_with(key, value, Expiry::Default)
    }

    /// Stores a value with an explicit expiration.
    pub fn set_with<K: CacheKey>(&self, key: K, value: V, expiry: Expiry) -> Option<V> {
        let key = normalize_key(&key)?;

        let needs_arming = {
            let mut store = self.store();
            store.set(key, value.clone(), expiry);
            if store.is_armed() {
                false
            } else {
                store.set_armed(true);
                true
            }
        };

        if needs_arming {
            self.schedule_cleanup();
        }

        Some(value)
    }

    /// Alias for [`Cache::set`].
    pub fn add<K: CacheKey>(&self, key: K, value: V) -> Option<V> {
        self.set(key, value)
    }

    /// Alias for [`Cache::set_with`].
    pub fn add_with<K: CacheKey>(&self, key: K, value: V, expiry: Expiry) -> Option<V> {
        self.set_with(key, value, expiry)
    }

    // == Get ==
    /// Reads a value. Expired entries are removed and read as None.
    pub fn get<K: CacheKey>(&self, key: K) -> Option<V> {
        self.fetch(key, false)
    }

    /// Reads a value even if it has expired.
    pub fn get_forced<K: CacheKey>(&self, key: K) -> Option<V> {
        self.fetch(key, true)
    }

    fn fetch<K: CacheKey>(&self, key: K, force: bool) -> Option<V> {
        let key = normalize_key(&key)?;
        self.store().get(&key, force).cloned()
    }

    // == Cleanup ==
    /// Runs one cleanup pass and re-arms the schedule while entries remain.
    ///
    /// `force` evicts every unread entry regardless of age when auto-cleanup
    /// is enabled.
    pub fn cleanup(&self, force: bool) -> CleanupReport {
        let (report, remaining, interval) = {
            let mut store = self.store();
            let report = store.cleanup(force);
            let remaining = store.len();
            if remaining == 0 {
                store.set_armed(false);
            }
            (report, remaining, store.config().cleanup_interval())
        };

        if report.removed() > 0 {
            info!(
                "Cache@{} cleanup: removed {} expired and {} idle entries",
                self.inner.id, report.expired, report.idle
            );
        } else {
            debug!("Cache@{} cleanup: nothing to remove", self.inner.id);
        }

        if remaining > 0 && interval.is_some() {
            self.schedule_cleanup();
        } else if remaining == 0 {
            self.inner.scheduler.cancel(&self.inner.cleanup_id);
        }

        report
    }

    fn schedule_cleanup(&self) {
        let Some(delay) = self.config().cleanup_interval() else {
            return;
        };

        // Without a runtime nothing is armed and the next write retries
        let armed = arm_cleanup(self, delay);
        self.store().set_armed(armed);
    }
}

impl<V: Clone + DeepClone + Send + 'static> Cache<V> {
    // == Copy ==
    /// Stores a deep copy of the value (copy-on-write).
    pub fn copy<K: CacheKey>(&self, key: K, value: V) -> Option<V> {
        self.store().record_clone();
        self.set(key, value.deep_clone())
    }

    // == Clone ==
    /// Reads a deep copy of the value (copy-on-read).
    pub fn clone_value<K: CacheKey>(&self, key: K) -> Option<V> {
        self.store().record_clone();
        self.get(key).map(|value| value.deep_clone())
    }

    /// Reads a deep copy of the value even if it has expired.
    pub fn clone_value_forced<K: CacheKey>(&self, key: K) -> Option<V> {
        self.store().record_clone();
        self.get_forced(key).map(|value| value.deep_clone())
    }
}

impl Default for Cache<Value> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

// == Weak Cache ==
/// A non-owning cache handle.
pub struct WeakCache<V = Value> {
    inner: Weak<Inner<V>>,
}

impl<V> WeakCache<V> {
    /// Returns the cache if it is still alive.
    pub fn upgrade(&self) -> Option<Cache<V>> {
        self.inner.upgrade().map(|inner| Cache { inner })
    }
}

impl<V> Clone for WeakCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}
