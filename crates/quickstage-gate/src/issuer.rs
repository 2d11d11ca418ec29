//! Ticket issuance.
//!
//! A ticket's signature covers its store-assigned id, which does not exist
//! until the ticket row does. Issuance therefore inserts a `PENDING`
//! placeholder, signs the assigned id, and patches the signature in (see
//! [`TicketStore::insert_signed`]).

use std::num::NonZeroU32;
use std::time::Duration;

use quickstage_core::db::unix_millis;
use quickstage_crypto::{AdminSecret, signature};
use tracing::{debug, info, warn};

use crate::storage::{DatabaseError, NewTicket, Ticket, TicketStore};

/// Default bound on a single issuance round-trip to the store.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on the up-front allocation for a batch; `count` is operator input.
const BATCH_CAPACITY_HINT: usize = 256;

/// Errors from ticket issuance.
#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),

    #[error("Store did not respond within {0:?}")]
    Timeout(Duration),
}

/// Creates signed tickets in a [`TicketStore`].
pub struct TicketIssuer<S> {
    store: S,
    store_timeout: Duration,
}

impl<S: TicketStore> TicketIssuer<S> {
    pub const fn new(store: S) -> Self {
        Self {
            store,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Issue one ticket admitting up to `usage_ceiling` valid scans.
    ///
    /// Returns `Ok(None)` without touching the store when no admin secret
    /// is set, and `Ok(None)` when the store ignores the insert under its
    /// conflict policy.
    pub async fn issue(
        &self,
        secret: Option<&AdminSecret>,
        usage_ceiling: NonZeroU32,
    ) -> Result<Option<Ticket>, IssueError> {
        let Some(secret) = secret else {
            debug!("No admin secret set, skipping issuance");
            return Ok(None);
        };

        let placeholder = NewTicket {
            max_usage: i64::from(usage_ceiling.get()),
            created_at: unix_millis(),
        };

        let insert = self
            .store
            .insert_signed(&placeholder, |id| signature(id, secret));
        let ticket = tokio::time::timeout(self.store_timeout, insert)
            .await
            .map_err(|_| IssueError::Timeout(self.store_timeout))??;

        match &ticket {
            Some(t) => info!(ticket_id = t.id, max_usage = t.max_usage, "Ticket issued"),
            None => warn!("Ticket insert ignored by store, no ticket issued"),
        }

        Ok(ticket)
    }

    /// Issue `count` tickets in sequence, stopping at the first failure.
    pub async fn issue_batch(
        &self,
        secret: Option<&AdminSecret>,
        usage_ceiling: NonZeroU32,
        count: usize,
    ) -> Result<Vec<Ticket>, IssueError> {
        if secret.is_none() {
            debug!("No admin secret set, skipping batch issuance");
            return Ok(Vec::new());
        }

        let mut issued = Vec::with_capacity(count.min(BATCH_CAPACITY_HINT));
        for _ in 0..count {
            if let Some(ticket) = self.issue(secret, usage_ceiling).await? {
                issued.push(ticket);
            }
        }
        Ok(issued)
    }
}
