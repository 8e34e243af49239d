//! Per-resource mutual exclusion.
//!
//! The registry maps a resource key to an async mutex. Entries are held
//! weakly: once no transfer holds or waits for a key, its mutex is freed and
//! the entry is pruned the next time a new key is registered. The registry's
//! own lock is only taken to look up or create an entry, never while a
//! transfer runs, so unrelated keys never wait on each other.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{Mutex as ResourceMutex, OwnedMutexGuard};
use tracing::trace;

/// Maps resource keys to their exclusive locks.
#[derive(Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, Weak<ResourceMutex<()>>>>,
}

impl fmt::Debug for LockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockRegistry")
            .field("live", &self.len())
            .finish()
    }
}

/// Exclusive access to one resource key.
///
/// Released by [`release`](Self::release) or when dropped.
pub struct ResourceGuard {
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl fmt::Debug for ResourceGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceGuard").field("key", &self.key).finish()
    }
}

impl ResourceGuard {
    /// The resource key this guard holds.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Gives up exclusive access.
    pub fn release(self) {
        trace!(key = %self.key, "releasing resource lock");
    }
}

impl LockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the caller holds exclusive access to `key`.
    pub async fn acquire(&self, key: &str) -> ResourceGuard {
        let lock = self.lock_for(key);
        trace!(key, "waiting for resource lock");
        let guard = lock.lock_owned().await;
        ResourceGuard {
            key: key.to_string(),
            _guard: guard,
        }
    }

    /// Number of keys currently held or waited for.
    pub fn len(&self) -> usize {
        self.entries()
            .values()
            .filter(|lock| lock.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Weak<ResourceMutex<()>>>> {
        // The map stays consistent even if a holder panicked.
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_for(&self, key: &str) -> Arc<ResourceMutex<()>> {
        let mut entries = self.entries();
        if let Some(lock) = entries.get(key).and_then(Weak::upgrade) {
            return lock;
        }

        entries.retain(|_, lock| lock.strong_count() > 0);
        let lock = Arc::new(ResourceMutex::new(()));
        entries.insert(key.to_string(), Arc::downgrade(&lock));
        lock
    }
}
