//! Per-ticket mutual exclusion.
//!
//! Counting a ticket's prior valid uses and appending the new audit entry
//! must happen as one unit, or two near-simultaneous scans of a ticket
//! with one use left could both be admitted. Validators that share a
//! [`TicketLocks`] serialize on the ticket id across that section.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-ticket async locks.
///
/// Entries exist only while a guard is held or awaited.
#[derive(Debug, Default)]
pub struct TicketLocks {
    locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl TicketLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `ticket_id`.
    pub async fn lock(&self, ticket_id: i64) -> TicketGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(ticket_id).or_default())
        };
        let guard = lock.lock_owned().await;
        TicketGuard {
            locks: self,
            ticket_id,
            guard: Some(guard),
        }
    }

    /// Number of tickets with a held or awaited lock.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one ticket id; released on drop.
#[derive(Debug)]
pub struct TicketGuard<'a> {
    locks: &'a TicketLocks,
    ticket_id: i64,
    guard: Option<OwnedMutexGuard<()>>,
}

impl TicketGuard<'_> {
    pub const fn ticket_id(&self) -> i64 {
        self.ticket_id
    }
}

impl Drop for TicketGuard<'_> {
    fn drop(&mut self) {
        // Release first so the strong count below only counts the map
        // entry and any waiters.
        drop(self.guard.take());

        let mut locks = self
            .locks
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.ticket_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.ticket_id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn entry_removed_after_release() {
        let locks = TicketLocks::new();
        {
            let guard = locks.lock(7).await;
            assert_eq!(guard.ticket_id(), 7);
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn different_tickets_do_not_block() {
        let locks = TicketLocks::new();
        let _a = locks.lock(1).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock(2)).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn same_ticket_waits_for_release() {
        let locks = Arc::new(TicketLocks::new());
        let first = locks.lock(1).await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.lock(1)).await;
        assert!(blocked.is_err());

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _g = locks.lock(1).await;
            })
        };
        drop(first);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(locks.is_empty());
    }
}
