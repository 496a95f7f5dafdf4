//! Per-key single-flight locking.
//!
//! At most one task at a time runs the critical section for a given key;
//! tasks working on different keys never wait on each other. Entries are
//! reference-counted and removed as soon as the last holder or waiter for a
//! key goes away, so the registry stays bounded by the number of keys in
//! flight.
//!
//! Each entry also carries a slot for the outcome of the section. Callers
//! that use [`KeyLockRegistry::single_flight`] and queue behind a running
//! section receive its outcome instead of running the section again. Once
//! the entry is dropped the next caller starts fresh.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

type Slot<T> = Arc<Mutex<Option<T>>>;

/// Registry of per-key async mutexes, each guarding a shared outcome of
/// type `T`.
#[derive(Debug)]
pub struct KeyLockRegistry<T = ()> {
    locks: DashMap<String, Slot<T>>,
}

/// Interest in one key's mutex. Dropping the lease releases the registry
/// entry when nobody else holds it.
struct KeyLease<'a, T> {
    locks: &'a DashMap<String, Slot<T>>,
    key: String,
    handle: Slot<T>,
}

impl<T> Drop for KeyLease<'_, T> {
    fn drop(&mut self) {
        // Two strong references left means only the map and this lease.
        self.locks.remove_if(&self.key, |_, entry| {
            Arc::ptr_eq(entry, &self.handle) && Arc::strong_count(entry) == 2
        });
    }
}

impl<T> Default for KeyLockRegistry<T> {
    fn default() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }
}

impl<T> KeyLockRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `critical` while holding the lock for `key`.
    ///
    /// The lock is released when the returned future completes or is
    /// dropped, whichever happens first. The shared outcome slot is left
    /// untouched.
    pub async fn with_lock<F, Fut, U>(&self, key: &str, critical: F) -> U
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = U>,
    {
        let lease = self.lease(key);
        let _guard = lease.handle.lock().await;
        critical().await
    }

    /// Run `critical` for `key` unless a section for the same key finished
    /// while this caller was queued, in which case its outcome is returned.
    ///
    /// A section that is cancelled leaves no outcome, so the next waiter
    /// runs `critical` itself.
    pub async fn single_flight<F, Fut>(&self, key: &str, critical: F) -> T
    where
        T: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let lease = self.lease(key);
        let mut slot = lease.handle.lock().await;
        if let Some(shared) = slot.as_ref() {
            return shared.clone();
        }
        let outcome = critical().await;
        *slot = Some(outcome.clone());
        outcome
    }

    /// Number of keys with a holder or waiter.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn lease(&self, key: &str) -> KeyLease<'_, T> {
        let handle = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .value()
            .clone();
        KeyLease {
            locks: &self.locks,
            key: key.to_string(),
            handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_key_is_mutually_exclusive() {
        let registry = Arc::new(KeyLockRegistry::<()>::new());
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                registry
                    .with_lock("52772", || async {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_different_keys_do_not_block() {
        let registry = Arc::new(KeyLockRegistry::<()>::new());
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let holder = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry
                    .with_lock("a", move || async move {
                        let _ = rx.await;
                    })
                    .await;
            })
        };

        // Key "b" completes while "a" is still held.
        let finished = tokio::time::timeout(
            Duration::from_secs(1),
            registry.with_lock("b", || async { 7 }),
        )
        .await;
        assert_eq!(finished.unwrap(), 7);

        tx.send(()).unwrap();
        holder.await.unwrap();
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn test_registry_tracks_live_keys() {
        let registry = KeyLockRegistry::<()>::new();
        let observed = registry
            .with_lock("x", || async { registry.len() })
            .await;
        assert_eq!(observed, 1);
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancelled_holder_releases_lock() {
        let registry = Arc::new(KeyLockRegistry::<()>::new());

        let stuck = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry
                    .with_lock("k", || std::future::pending::<()>())
                    .await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(registry.len(), 1);

        stuck.abort();
        let _ = stuck.await;

        let value = tokio::time::timeout(
            Duration::from_secs(1),
            registry.with_lock("k", || async { "acquired" }),
        )
        .await
        .unwrap();
        assert_eq!(value, "acquired");
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn test_timed_out_holder_leaves_no_entry() {
        let registry = KeyLockRegistry::<()>::new();
        let result = tokio::time::timeout(
            Duration::from_millis(20),
            registry.with_lock("k", || std::future::pending::<()>()),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_queued_callers_share_the_first_outcome() {
        let registry = Arc::new(KeyLockRegistry::<Option<u32>>::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            let runs = Arc::clone(&runs);
            handles.push(tokio::spawn(async move {
                registry
                    .single_flight("404", || async {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        None
                    })
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), None);
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn test_outcome_is_not_kept_after_the_entry_drains() {
        let registry = KeyLockRegistry::<u32>::new();
        assert_eq!(registry.single_flight("k", || async { 1 }).await, 1);
        assert_eq!(registry.single_flight("k", || async { 2 }).await, 2);
        assert!(registry.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancelled_section_leaves_no_outcome() {
        let registry = Arc::new(KeyLockRegistry::<&'static str>::new());

        let stuck = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry
                    .single_flight("k", || std::future::pending::<&'static str>())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let waiter = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.single_flight("k", || async { "ran" }).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        stuck.abort();
        let _ = stuck.await;

        let value = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, "ran");
        assert_eq!(registry.len(), 0);
    }
}
