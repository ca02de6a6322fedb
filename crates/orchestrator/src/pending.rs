//! Ephemeral per-user conversational state.

use std::collections::HashMap;
use std::sync::Arc;

use bot_core::Category;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Pending-request storage.
///
/// Thread-safe map from user id to the category the user's next free-text
/// message should be interpreted as. A user has at most one pending
/// request: selecting again overwrites, and the next message consumes it
/// regardless of content.
#[derive(Default)]
pub struct PendingStore {
    pending: RwLock<HashMap<i64, Category>>,
}

impl PendingStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            pending: RwLock::new(HashMap::new()),
        }
    }

    /// Record a pending request, replacing any previous one.
    pub async fn set(&self, user_id: i64, category: Category) {
        self.pending.write().await.insert(user_id, category);
    }

    /// Consume the pending request for a user, if any.
    pub async fn take(&self, user_id: i64) -> Option<Category> {
        self.pending.write().await.remove(&user_id)
    }

    /// Whether a user currently has a pending request.
    pub async fn contains(&self, user_id: i64) -> bool {
        self.pending.read().await.contains_key(&user_id)
    }
}

/// Per-user serialization for the balance-check-to-persist window.
///
/// Two rapid messages from the same user must not interleave between the
/// balance check and the settlement; each user id owns one mutex.
#[derive(Default)]
pub(crate) struct UserLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub(crate) fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock for a user, creating it on first use.
    pub(crate) async fn acquire(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_take_consumes() {
        let store = PendingStore::new();
        store.set(1, Category::IpAddress).await;

        assert_eq!(store.take(1).await, Some(Category::IpAddress));
        assert_eq!(store.take(1).await, None);
    }

    #[tokio::test]
    async fn test_second_selection_overwrites() {
        let store = PendingStore::new();
        store.set(1, Category::IpAddress).await;
        store.set(1, Category::PostalCode).await;

        assert_eq!(store.take(1).await, Some(Category::PostalCode));
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let store = PendingStore::new();
        store.set(1, Category::IpAddress).await;

        assert!(!store.contains(2).await);
        assert_eq!(store.take(2).await, None);
        assert!(store.contains(1).await);
    }

    #[tokio::test]
    async fn test_user_lock_serializes() {
        let locks = Arc::new(UserLocks::new());

        let guard = locks.acquire(1).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(1).await;
            })
        };

        // The contender cannot finish while the lock is held.
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }
}
