//! Cache Module
//!
//! Provides in-memory caching with time-based expiration, insertion-order
//! capacity eviction and idle cleanup.

mod entry;
mod handle;
mod key;
mod key_order;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub use entry::CacheEntry;
pub use handle::{Cache, WeakCache};
pub use key::{normalize_key, CacheKey};
pub use key_order::KeyOrder;
pub use stats::CacheStats;
pub use store::{CacheStore, CleanupReport};

// == Public Constants ==
/// Age after which an unread entry is evicted when auto-cleanup is enabled
pub const IDLE_THRESHOLD: Duration = Duration::from_millis(60 * 1000);

/// Default time-to-live when the cache is created without one
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_millis(3 * 60 * 1000);

/// Default capacity when the cache is created without one
pub const DEFAULT_MAX_LENGTH: usize = 1000;
