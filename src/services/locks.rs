use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

const PRUNE_THRESHOLD: usize = 1024;

/// Async mutexes keyed by owner id. Holding the guard serializes every
/// cart read-modify-write for that owner.
#[derive(Debug, Default)]
pub struct OwnerLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl OwnerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, owner: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() >= PRUNE_THRESHOLD {
                // only the map holds idle entries
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            locks.entry(owner).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}
