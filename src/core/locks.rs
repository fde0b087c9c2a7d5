use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-user mutation locks. Every read-compute-commit cycle for a user's
/// ledger runs under that user's lock, so concurrent requests serialize in
/// arrival order and each one sees the previous one's committed state.
/// Operations for different users never contend.
#[derive(Clone, Default)]
pub struct UserLocks {
    inner: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        UserLocks::default()
    }

    /// Acquires the lock for `user_id`, creating it on first use. Lock
    /// entries are kept for the life of the process; the map is bounded by
    /// the number of distinct users seen.
    pub async fn acquire(&self, user_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(user_id).or_insert_with(|| Arc::new(Mutex::new(()))))
        };
        lock.lock_owned().await
    }
}
