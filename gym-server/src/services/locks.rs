//! Per-client write serialization

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of one async mutex per client id.
///
/// Read-validate-write sequences for the same client (payment overlap,
/// daily check-in, rename) take the client's guard first. Different
/// clients never contend.
#[derive(Debug, Default)]
pub struct ClientLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl ClientLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and hold the guard of `client_id`
    pub async fn acquire(&self, client_id: i64) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the shard lock is released before awaiting
        let lock = self
            .locks
            .entry(client_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Hold the guards of several clients, taken in ascending id order so
    /// two callers locking the same pair cannot deadlock
    pub async fn acquire_all(&self, client_ids: &[i64]) -> Vec<OwnedMutexGuard<()>> {
        let mut ids = client_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.acquire(id).await);
        }
        guards
    }

    /// Drop entries nobody holds or waits on
    pub fn prune(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - self.locks.len()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_client_serializes() {
        let locks = Arc::new(ClientLocks::new());
        let guard = locks.acquire(1).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire(1).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_other_clients_do_not_wait() {
        let locks = ClientLocks::new();
        let _a = locks.acquire(1).await;
        let _b = locks.acquire(2).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_acquire_all_dedups_and_waits_on_each() {
        let locks = Arc::new(ClientLocks::new());
        let guards = locks.acquire_all(&[3, 1, 3]).await;
        assert_eq!(guards.len(), 2);

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire_all(&[1, 2]).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guards);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_prune_keeps_held_locks() {
        let locks = ClientLocks::new();
        let held = locks.acquire(1).await;
        drop(locks.acquire(2).await);

        assert_eq!(locks.prune(), 1);
        assert_eq!(locks.len(), 1);
        drop(held);
        assert_eq!(locks.prune(), 1);
        assert!(locks.is_empty());
    }
}
