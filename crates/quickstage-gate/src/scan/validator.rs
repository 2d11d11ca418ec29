//! The scan validation state machine.
//!
//! ```text
//! Idle ─▶ Parse ─▶ Authenticate ─▶ Resolve ─▶ Rate-limit ─▶ Accept
//!  ▲        └───────────┴──────────────┴──────────┴───────────┘
//!  │                               ▼
//!  └───── reset ───── Error(..) / Success(..)
//! ```
//!
//! Every exit appends exactly one audit entry.
//!
//! While a result is presented, further payloads are dropped until the
//! operator calls [`ScanValidator::reset`]. This debounces a camera that
//! keeps decoding the same code.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use quickstage_core::db::unix_millis;
use quickstage_crypto::{AdminSecret, TicketPayload, verify};
use tracing::{debug, error, info, warn};

use super::locks::TicketLocks;
use super::outcome::{Rejection, ScanOutcome, ScanStatus};
use crate::issuer::DEFAULT_STORE_TIMEOUT;
use crate::storage::{
    DatabaseError, NewScanLog, ScanLogStore, TicketStore, UNRESOLVED_TICKET_ID,
};

/// Debounce gate.
#[derive(Debug, Clone, Default)]
enum Gate {
    #[default]
    Idle,
    /// A payload is in the pipeline.
    Busy,
    /// A result awaits operator acknowledgment.
    Presenting(ScanStatus),
}

/// Validates scanned payloads against a ticket store and audit log.
pub struct ScanValidator<S> {
    store: S,
    locks: Arc<TicketLocks>,
    gate: Mutex<Gate>,
    store_timeout: Duration,
}

impl<S: TicketStore + ScanLogStore> ScanValidator<S> {
    /// A validator with its own lock registry.
    pub fn new(store: S) -> Self {
        Self::with_locks(store, Arc::new(TicketLocks::new()))
    }

    /// A validator that serializes per ticket with every other validator
    /// sharing `locks`.
    pub fn with_locks(store: S, locks: Arc<TicketLocks>) -> Self {
        Self {
            store,
            locks,
            gate: Mutex::new(Gate::Idle),
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

    /// The status to show the operator. A payload still in the pipeline
    /// has nothing to show yet and reads as `Idle`.
    pub fn status(&self) -> ScanStatus {
        match &*self.gate() {
            Gate::Idle | Gate::Busy => ScanStatus::Idle,
            Gate::Presenting(status) => status.clone(),
        }
    }

    /// Acknowledge the presented result so the next scan is accepted.
    ///
    /// Has no effect while a payload is still being validated.
    pub fn reset(&self) {
        let mut gate = self.gate();
        if matches!(*gate, Gate::Presenting(_)) {
            *gate = Gate::Idle;
        }
    }

    /// Validate one scanned payload.
    ///
    /// Returns `None`, with no audit entry, when no admin secret is set or
    /// when a previous result has not been acknowledged yet. Otherwise
    /// exactly one audit entry is appended and the outcome is presented
    /// until [`reset`](Self::reset).
    pub async fn validate(
        &self,
        payload: &str,
        secret: Option<&AdminSecret>,
    ) -> Option<ScanOutcome> {
        let Some(secret) = secret else {
            debug!("No admin secret set, ignoring scan");
            return None;
        };

        let Some(claim) = self.claim() else {
            debug!("Result still presented, dropping scan");
            return None;
        };

        let outcome = self.run(payload, secret).await;
        claim.present(outcome.status());
        Some(outcome)
    }

    async fn run(&self, payload: &str, secret: &AdminSecret) -> ScanOutcome {
        let parsed = match TicketPayload::parse(payload) {
            Ok(parsed) => parsed,
            Err(e) => return self.finish(UNRESOLVED_TICKET_ID, Err(e.into())).await,
        };
        let ticket_id = parsed.ticket_id;

        if !verify(ticket_id, secret, &parsed.signature) {
            return self.finish(ticket_id, Err(Rejection::InvalidHash)).await;
        }

        // Held until the audit entry is appended.
        let _guard = self.locks.lock(ticket_id).await;

        match self.admit(ticket_id).await {
            Err(reason @ Rejection::Processing(_)) => {
                self.finish(UNRESOLVED_TICKET_ID, Err(reason)).await
            }
            verdict => self.finish(ticket_id, verdict).await,
        }
    }

    async fn admit(&self, ticket_id: i64) -> Result<(), Rejection> {
        let ticket = self
            .bounded(self.store.get_ticket(ticket_id))
            .await?
            .ok_or(Rejection::NotFound)?;

        let uses = self.bounded(self.store.count_valid_uses(ticket_id)).await?;
        if uses >= ticket.max_usage {
            return Err(Rejection::UsageLimitExceeded);
        }

        Ok(())
    }

    /// Append the audit entry for `verdict` and build the outcome.
    ///
    /// A verdict that cannot be recorded is not reported: it becomes a
    /// processing error against the unresolved id, which is then logged
    /// best-effort.
    async fn finish(&self, ticket_id: i64, verdict: Result<(), Rejection>) -> ScanOutcome {
        let outcome = match verdict {
            Ok(()) => ScanOutcome::Admitted { ticket_id },
            Err(reason) => ScanOutcome::Rejected { ticket_id, reason },
        };

        let detail = match self.append(&outcome).await {
            Ok(()) => {
                log_outcome(&outcome);
                return outcome;
            }
            Err(Rejection::Processing(detail)) => detail,
            Err(other) => other.to_string(),
        };
        error!(ticket_id, valid = outcome.is_valid(), error = %detail, "Failed to record scan");

        // Already the catch-all outcome; a second append would fail the same way.
        if matches!(outcome.rejection(), Some(Rejection::Processing(_))) {
            log_outcome(&outcome);
            return outcome;
        }

        let fallback = ScanOutcome::Rejected {
            ticket_id: UNRESOLVED_TICKET_ID,
            reason: Rejection::Processing(detail),
        };
        if let Err(e) = self.append(&fallback).await {
            error!(error = %e, "Failed to record scan failure");
        }
        log_outcome(&fallback);
        fallback
    }

    async fn append(&self, outcome: &ScanOutcome) -> Result<(), Rejection> {
        let entry = NewScanLog {
            ticket_id: outcome.ticket_id(),
            scanned_at: unix_millis(),
            is_valid: outcome.is_valid(),
            message: outcome.message(),
        };
        if self.bounded(self.store.insert_scan_log(&entry)).await?.is_none() {
            warn!(ticket_id = entry.ticket_id, "Scan log insert ignored by store");
        }
        Ok(())
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, DatabaseError>>,
    ) -> Result<T, Rejection> {
        match tokio::time::timeout(self.store_timeout, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(Rejection::Processing(e.to_string())),
            Err(_) => Err(Rejection::Processing(format!(
                "store did not respond within {:?}",
                self.store_timeout
            ))),
        }
    }

    fn gate(&self) -> std::sync::MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn claim(&self) -> Option<Claim<'_>> {
        let mut gate = self.gate();
        if !matches!(*gate, Gate::Idle) {
            return None;
        }
        *gate = Gate::Busy;
        Some(Claim {
            gate: &self.gate,
            presented: false,
        })
    }
}

fn log_outcome(outcome: &ScanOutcome) {
    let ticket_id = outcome.ticket_id();
    match outcome.rejection() {
        None => info!(ticket_id, valid = true, "Ticket admitted"),
        Some(reason) => warn!(ticket_id, valid = false, reason = %reason, "Scan rejected"),
    }
}

/// Ownership of the `Busy` gate. Dropping it unpresented (the validation
/// future was abandoned) reopens the gate; audit entries already appended
/// stay.
struct Claim<'a> {
    gate: &'a Mutex<Gate>,
    presented: bool,
}

impl Claim<'_> {
    fn present(mut self, status: ScanStatus) {
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner) = Gate::Presenting(status);
        self.presented = true;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.presented {
            *self.gate.lock().unwrap_or_else(PoisonError::into_inner) = Gate::Idle;
        }
    }
}
