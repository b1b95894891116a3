//! Per-user async locks serializing token issuance

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, Weak};

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Arena of per-user async mutexes
///
/// Entries are weak so an idle user costs nothing; dead entries are pruned whenever
/// a new lock is handed out.
#[derive(Default)]
pub struct UserLocks {
    entries: StdMutex<HashMap<Uuid, Weak<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the lock of `user_id`
    pub async fn lock(&self, user_id: Uuid) -> OwnedMutexGuard<()> {
        self.handle(user_id).lock_owned().await
    }

    fn handle(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(existing) = entries.get(&user_id).and_then(Weak::upgrade) {
            return existing;
        }

        entries.retain(|_, entry| entry.strong_count() > 0);

        let mutex = Arc::new(Mutex::new(()));
        entries.insert(user_id, Arc::downgrade(&mutex));
        mutex
    }

    /// Number of users with a lock currently held or awaited
    pub fn active(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }
}
