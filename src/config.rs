//! Configuration Module
//!
//! Cache construction parameters, with defaults and environment loading.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::cache::{DEFAULT_MAX_DURATION, DEFAULT_MAX_LENGTH, IDLE_THRESHOLD};
use crate::error::{CacheError, Result};

// == Expiry ==
/// Time-to-live argument for writes and for the cache-wide default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// Use the cache default (for writes) or the built-in maximum (for configs)
    #[default]
    Default,
    /// Never expire by time
    Never,
    /// Expire after the given duration; a zero duration means `Default`
    After(Duration),
}

impl Expiry {
    /// Shorthand for `Expiry::After(Duration::from_millis(ms))`.
    pub fn millis(ms: u64) -> Self {
        Expiry::After(Duration::from_millis(ms))
    }

    /// Resolves this argument against a fallback duration.
    ///
    /// Returns `None` when the result never expires.
    pub fn resolve(self, fallback: Option<Duration>) -> Option<Duration> {
        match self {
            Expiry::Never => None,
            Expiry::After(ttl) if !ttl.is_zero() => Some(ttl),
            _ => fallback,
        }
    }
}

impl From<Duration> for Expiry {
    fn from(ttl: Duration) -> Self {
        Expiry::After(ttl)
    }
}

// == Limit ==
/// Capacity argument for cache construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    /// 1000 entries
    #[default]
    Default,
    /// No capacity eviction
    Unbounded,
    /// At most this many entries; zero means `Default`
    Max(usize),
}

impl Limit {
    fn resolve(self) -> Option<usize> {
        match self {
            Limit::Unbounded => None,
            Limit::Max(n) if n > 0 => Some(n),
            _ => Some(DEFAULT_MAX_LENGTH),
        }
    }
}

/// Cache configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Default time-to-live for writes without an explicit duration, None = never expire
    pub max_duration: Option<Duration>,
    /// Maximum number of entries, None = unbounded
    pub max_length: Option<usize>,
    /// Evict entries nobody read since the last cleanup pass
    pub auto_cleanup: bool,
}

impl CacheConfig {
    // == Constructor ==
    /// Creates a configuration from the three construction arguments.
    ///
    /// # Arguments
    /// * `max_duration` - Default TTL; `Default` (or zero) is 180 seconds
    /// * `max_length` - Capacity; `Default` (or zero) is 1000 entries
    /// * `auto_cleanup` - Enables idle eviction
    pub fn new(max_duration: Expiry, max_length: Limit, auto_cleanup: bool) -> Self {
        Self {
            max_duration: max_duration.resolve(Some(DEFAULT_MAX_DURATION)),
            max_length: max_length.resolve(),
            auto_cleanup,
        }
    }

    /// Sets the default time-to-live.
    pub fn max_duration(mut self, max_duration: Expiry) -> Self {
        self.max_duration = max_duration.resolve(Some(DEFAULT_MAX_DURATION));
        self
    }

    /// Sets the capacity.
    pub fn max_length(mut self, max_length: Limit) -> Self {
        self.max_length = max_length.resolve();
        self
    }

    /// Enables or disables idle eviction.
    pub fn auto_cleanup(mut self, enabled: bool) -> Self {
        self.auto_cleanup = enabled;
        self
    }

    // == Cleanup Interval ==
    /// Delay between scheduled cleanup passes, or None when nothing can expire.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        if self.auto_cleanup {
            Some(IDLE_THRESHOLD)
        } else {
            self.max_duration
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// Malformed values are logged and replaced by their defaults.
    ///
    /// # Environment Variables
    /// - `FLEXICACHE_MAX_DURATION_MS` - Default TTL in ms, `false`/`never` disables (default: 180000)
    /// - `FLEXICACHE_MAX_LENGTH` - Capacity, `false`/`unbounded` disables (default: 1000)
    /// - `FLEXICACHE_AUTO_CLEANUP` - `true`/`1`/`yes` enables idle eviction (default: false)
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_else(|err| {
            warn!("{}, falling back to defaults", err);
            Self::default()
        })
    }

    /// Like [`CacheConfig::from_env`] but reports malformed values.
    pub fn try_from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_duration = match lookup("FLEXICACHE_MAX_DURATION_MS") {
            None => Expiry::Default,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "false" | "never" => Expiry::Never,
                value => Expiry::millis(value.parse().map_err(|_| {
                    CacheError::InvalidConfig(format!("FLEXICACHE_MAX_DURATION_MS={}", raw))
                })?),
            },
        };

        let max_length = match lookup("FLEXICACHE_MAX_LENGTH") {
            None => Limit::Default,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "false" | "unbounded" => Limit::Unbounded,
                value => Limit::Max(value.parse().map_err(|_| {
                    CacheError::InvalidConfig(format!("FLEXICACHE_MAX_LENGTH={}", raw))
                })?),
            },
        };

        let auto_cleanup = lookup("FLEXICACHE_AUTO_CLEANUP")
            .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        Ok(Self::new(max_duration, max_length, auto_cleanup))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(Expiry::Default, Limit::Default, false)
    }
}
