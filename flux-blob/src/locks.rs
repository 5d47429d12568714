use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-upload async locks.
///
/// Chunk writes, completion and cancellation of one upload take the same
/// lock so a late chunk cannot slip in between assembly and cleanup.
/// Distinct uploads never contend.
#[derive(Debug, Default, Clone)]
pub struct UploadLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl UploadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop the entry for a finished upload if nobody else holds it
    pub fn release(&self, key: &str) {
        // strong count 1 means only the map references the lock
        self.locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Number of uploads currently tracked
    pub fn tracked(&self) -> usize {
        self.locks.len()
    }
}
