//! Background Tasks Module
//!
//! Deferred work that runs on the tokio runtime.
//!
//! # Tasks
//! - Debounced scheduling: at most one pending callback per identifier
//! - Cache cleanup: the recurring, self-rescheduling sweep of a cache

mod cleanup;
mod scheduler;

pub(crate) use cleanup::arm_cleanup;
pub use cleanup::cleanup_identifier;
pub use scheduler::DebounceScheduler;
