//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with expiration and
//! access bookkeeping.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Time of the last write (insert or update)
    pub created_at: Instant,
    /// Expiration instant, None = never expires by time
    pub expires_at: Option<Instant>,
    /// Successful reads since creation or the last cleanup pass
    pub access_count: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry written at `now`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Optional time-to-live, None = never expires
    /// * `now` - Write time
    ///
    /// A deadline past the representable range never expires.
    pub fn new_at(value: V, ttl: Option<Duration>, now: Instant) -> Self {
        Self {
            value,
            created_at: now,
            expires_at: ttl.and_then(|ttl| now.checked_add(ttl)),
            access_count: 0,
        }
    }

    // == Refresh ==
    /// Overwrites the value and restarts the expiration window at `now`.
    ///
    /// The access counter is kept; only reads and cleanup passes change it.
    pub fn refresh_at(&mut self, value: V, ttl: Option<Duration>, now: Instant) {
        self.value = value;
        self.created_at = now;
        self.expires_at = ttl.and_then(|ttl| now.checked_add(ttl));
    }

    // == Validity ==
    /// Returns true if the entry may be served at `now`.
    ///
    /// An entry with an expiration is valid strictly before it.
    pub fn is_valid_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now < expires,
            None => true,
        }
    }

    /// Returns true if a cleanup pass at `now` should drop this entry for
    /// having outlived its expiration.
    pub fn is_stale_at(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(expires) if now > expires)
    }

    /// Time since the last write.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Returns remaining time to live, or None if no expiration is set.
    pub fn ttl_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(now))
    }

    /// Records a successful read.
    pub fn touch(&mut self) {
        self.access_count += 1;
    }
}
