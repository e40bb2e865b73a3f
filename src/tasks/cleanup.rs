//! Cache Cleanup Task
//!
//! Arms the deferred cleanup pass of a cache on its debounce scheduler. The
//! pass re-arms itself through [`Cache::cleanup`] while entries remain.

use std::time::Duration;

use tracing::debug;

use crate::cache::Cache;

/// Scheduler identifier of a cache's cleanup pass.
pub fn cleanup_identifier(cache_id: u64) -> String {
    format!("cache-cleanup-{}", cache_id)
}

/// Schedules the next cleanup pass of `cache` after `delay`.
///
/// The pending task only holds a weak handle, so it never keeps the cache
/// alive. Returns false if no runtime is available.
pub(crate) fn arm_cleanup<V>(cache: &Cache<V>, delay: Duration) -> bool
where
    V: Clone + Send + 'static,
{
    let id = cache.id();
    let weak = cache.downgrade();

    let armed = cache
        .scheduler()
        .schedule(&cleanup_identifier(id), delay, move || match weak.upgrade() {
            Some(cache) => {
                cache.cleanup(false);
            }
            None => debug!("Cache@{} dropped before its cleanup pass", id),
        });

    if armed {
        debug!("Cache@{} cleanup scheduled in {:?}", id, delay);
    }
    armed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheConfig, Expiry, Limit};
    use crate::value::Value;

    #[test]
    fn test_cleanup_identifier() {
        assert_eq!(cleanup_identifier(7), "cache-cleanup-7");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache: Cache = Cache::create(Expiry::millis(1000), Limit::Default, false);

        cache.set_with("expire_soon", Value::from("value"), Expiry::millis(10));
        cache.set("long_lived", Value::from("value"));

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.count(), 1);
        assert!(cache.all().contains_key("long_lived"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache: Cache = Cache::create(Expiry::millis(100), Limit::Default, false);

        cache.set_with("long_lived", Value::from("value"), Expiry::millis(3_600_000));

        tokio::time::sleep(Duration::from_millis(550)).await;

        assert_eq!(cache.get("long_lived"), Some(Value::from("value")));
        assert!(cache.is_scheduled(), "non-empty cache keeps its cleanup loop");
        assert!(cache.stats().cleanups >= 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_cache_is_not_kept_alive() {
        let cache: Cache = Cache::new(CacheConfig::new(Expiry::millis(10), Limit::Default, false));
        let weak = cache.downgrade();

        cache.set("foo", Value::from("bar"));
        assert!(arm_cleanup(&cache, Duration::from_millis(50)));
        drop(cache);

        assert!(weak.upgrade().is_none());
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_entries_swept_by_schedule() {
        let cache: Cache = Cache::create(Expiry::Never, Limit::Unbounded, true);

        cache.set("read", Value::from(1));
        cache.set("unread", Value::from(2));

        // Keep "read" busy across every idle window
        for _ in 0..4 {
            cache.get("read");
            tokio::time::sleep(Duration::from_secs(45)).await;
        }

        assert!(cache.get("read").is_some());
        assert!(cache.all().get("unread").is_none());
    }
}
