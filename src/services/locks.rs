//! Keyed async mutexes.
//!
//! Holders of the same key are serialized; different keys proceed in parallel.
//! Entries are evicted once the last holder or waiter lets go.

use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of per-key locks.
pub struct KeyedLocks<K: Eq + Hash + Clone> {
    locks: DashMap<K, Arc<Mutex<()>>>,
}

/// Per-build write lock registry.
pub type BuildLocks = KeyedLocks<Uuid>;

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Wait for exclusive access to `key`.
    ///
    /// Dropping the returned future before it completes releases the waiter's
    /// claim on the entry.
    pub fn acquire(&self, key: K) -> Acquire<'_, K> {
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();

        Acquire {
            registry: self,
            key: Some(key),
            wait: Some(Box::pin(lock.lock_owned())),
        }
    }

    /// Drop `key` if only the registry still references its lock.
    fn evict_idle(&self, key: &K) {
        self.locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

type LockWait = Pin<Box<dyn Future<Output = OwnedMutexGuard<()>> + Send>>;

/// Pending acquisition returned by [`KeyedLocks::acquire`].
pub struct Acquire<'a, K: Eq + Hash + Clone> {
    registry: &'a KeyedLocks<K>,
    key: Option<K>,
    wait: Option<LockWait>,
}

// `K` is never pinned in place.
impl<K: Eq + Hash + Clone> Unpin for Acquire<'_, K> {}

impl<'a, K: Eq + Hash + Clone> Future for Acquire<'a, K> {
    type Output = KeyedGuard<'a, K>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let Some(wait) = this.wait.as_mut() else {
            return Poll::Pending;
        };
        let guard = ready!(wait.as_mut().poll(cx));
        this.wait = None;

        match this.key.take() {
            Some(key) => Poll::Ready(KeyedGuard {
                registry: this.registry,
                key,
                guard: Some(guard),
            }),
            None => Poll::Pending,
        }
    }
}

impl<K: Eq + Hash + Clone> Drop for Acquire<'_, K> {
    fn drop(&mut self) {
        // Completed acquisitions hand eviction to their guard.
        let Some(key) = self.key.take() else {
            return;
        };
        drop(self.wait.take());
        self.registry.evict_idle(&key);
    }
}

/// Exclusive access to one key; released on drop.
pub struct KeyedGuard<'a, K: Eq + Hash + Clone> {
    registry: &'a KeyedLocks<K>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash + Clone> Drop for KeyedGuard<'_, K> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the registry's own reference left: nobody holds or waits on this key.
        self.registry.evict_idle(&self.key);
    }
}
