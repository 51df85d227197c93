//! Per-conversation serialization of chat turns.
//!
//! A chat turn reads history, awaits the completion provider and then appends
//! to history. Holding the conversation's lock across all three keeps two
//! concurrent turns on the same id from building their context off the same
//! stale history.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::types::ConversationId;

/// One async mutex per conversation id, created on first use and dropped once
/// nobody holds or waits for it.
#[derive(Debug, Default)]
pub struct ConversationLocks {
    locks: DashMap<ConversationId, Arc<Mutex<()>>>,
}

/// Exclusive access to one conversation; released on drop.
#[derive(Debug)]
#[must_use = "the conversation is released as soon as the guard is dropped"]
pub struct ConversationGuard<'a> {
    locks: &'a ConversationLocks,
    id: ConversationId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ConversationLocks {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a conversation.
    pub async fn acquire(&self, id: &ConversationId) -> ConversationGuard<'_> {
        // Clone the Arc out so no map shard stays locked across the await.
        let lock = Arc::clone(self.locks.entry(id.clone()).or_default().value());
        let guard = lock.lock_owned().await;
        ConversationGuard {
            locks: self,
            id: id.clone(),
            guard: Some(guard),
        }
    }

    /// Number of conversations currently holding or awaiting a lock.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no conversation currently holds or awaits a lock.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for ConversationGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold a clone of the Arc, so a count of one means only the
        // table still references the mutex. The shard lock taken by
        // `remove_if` excludes a concurrent `acquire` on the same id.
        self.locks
            .locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_id_is_exclusive() {
        let locks = ConversationLocks::new();
        let id = ConversationId::from("a");

        let guard = locks.acquire(&id).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(&id)).await;
        assert!(second.is_err());

        drop(guard);
        let third = tokio::time::timeout(Duration::from_millis(50), locks.acquire(&id)).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn test_different_ids_do_not_contend() {
        let locks = ConversationLocks::new();
        let _a = locks.acquire(&ConversationId::from("a")).await;
        let b = tokio::time::timeout(
            Duration::from_millis(50),
            locks.acquire(&ConversationId::from("b")),
        )
        .await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_released_locks_are_pruned() {
        let locks = ConversationLocks::new();
        for n in 0..10 {
            let guard = locks.acquire(&ConversationId::new(format!("c{n}"))).await;
            assert_eq!(locks.len(), 1);
            drop(guard);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_lock_kept_while_a_turn_is_waiting() {
        let locks = ConversationLocks::new();
        let id = ConversationId::from("a");

        let first = locks.acquire(&id).await;
        let (second, ()) = tokio::join!(locks.acquire(&id), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(first);
            assert_eq!(locks.len(), 1);
        });

        assert_eq!(locks.len(), 1);
        drop(second);
        assert!(locks.is_empty());
    }
}
