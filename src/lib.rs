//! FlexiCache - An in-process key/value cache
//!
//! Provides time-based expiration, insertion-order capacity eviction,
//! opportunistic idle cleanup and deep-copy access.

pub mod cache;
pub mod config;
pub mod error;
pub mod registry;
pub mod tasks;
pub mod value;

pub use cache::{Cache, CacheEntry, CacheKey, CacheStats, CleanupReport};
pub use config::{CacheConfig, Expiry, Limit};
pub use error::{CacheError, Result};
pub use registry::{CacheRegistry, CacheSnapshot};
pub use tasks::DebounceScheduler;
pub use value::{CloneValue, DeepClone, NodeLike, Pattern, Shared, Value};
