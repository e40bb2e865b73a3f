//! Debounce Scheduler
//!
//! Maps an identifier to a single pending deferred callback. Scheduling an
//! identifier again cancels the previous callback before registering the new
//! one, so only the most recent one fires.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::debug;

#[derive(Debug)]
struct Pending {
    token: u64,
    handle: AbortHandle,
}

type PendingMap = Arc<Mutex<HashMap<String, Pending>>>;

fn lock(pending: &Mutex<HashMap<String, Pending>>) -> MutexGuard<'_, HashMap<String, Pending>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

// == Debounce Scheduler ==
/// Single-shot timers keyed by identifier.
///
/// Clones share the same pending table.
#[derive(Debug, Clone, Default)]
pub struct DebounceScheduler {
    pending: PendingMap,
    next_token: Arc<AtomicU64>,
}

impl DebounceScheduler {
    /// Creates a scheduler with no pending callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    // == Schedule ==
    /// Runs `callback` once after `delay`, replacing any callback still
    /// pending under `id`.
    ///
    /// The identifier's entry is removed before the callback runs, so the
    /// callback may schedule the same identifier again.
    ///
    /// Returns false (and schedules nothing) outside a tokio runtime.
    pub fn schedule<F>(&self, id: &str, delay: Duration, callback: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            debug!("No tokio runtime, '{}' not scheduled", id);
            return false;
        };

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let mut pending = lock(&self.pending);

        if let Some(previous) = pending.remove(id) {
            previous.handle.abort();
        }

        let table = Arc::clone(&self.pending);
        let key = id.to_string();
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            // An aborted timer may already be past its sleep
            let current = {
                let mut pending = lock(&table);
                match pending.get(&key) {
                    Some(entry) if entry.token == token => pending.remove(&key).is_some(),
                    _ => false,
                }
            };

            if current {
                callback();
            }
        });

        pending.insert(
            id.to_string(),
            Pending {
                token,
                handle: task.abort_handle(),
            },
        );
        true
    }

    // == Cancel ==
    /// Cancels the callback pending under `id`. Returns true if one was pending.
    pub fn cancel(&self, id: &str) -> bool {
        match lock(&self.pending).remove(id) {
            Some(previous) => {
                previous.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Returns true if a callback is pending under `id`.
    pub fn is_pending(&self, id: &str) -> bool {
        lock(&self.pending).contains_key(id)
    }

    /// Number of identifiers with a pending callback.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}
