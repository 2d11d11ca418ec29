//! Store traits consumed by the issuer and the validator.
//!
//! [`Database`](super::Database) implements both; tests substitute their own
//! doubles. Every method returns a `Send` future so validations can run on
//! any tokio worker.

use std::future::Future;

use super::db::DatabaseError;
use super::models::{NewScanLog, NewTicket, ScanLog, Ticket};

/// Durable record of issued tickets.
pub trait TicketStore: Send + Sync {
    /// Insert a placeholder and return the assigned id.
    ///
    /// Conflict policy is ignore-on-duplicate: a rejected insert yields
    /// `Ok(None)`, not an error.
    fn insert_ticket(
        &self,
        placeholder: &NewTicket,
    ) -> impl Future<Output = Result<Option<i64>, DatabaseError>> + Send;

    /// Full-record replace by id.
    fn update_ticket(&self, ticket: &Ticket)
    -> impl Future<Output = Result<(), DatabaseError>> + Send;

    fn get_ticket(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Ticket>, DatabaseError>> + Send;

    /// All tickets, most recently created first.
    fn list_tickets(&self) -> impl Future<Output = Result<Vec<Ticket>, DatabaseError>> + Send;

    /// Two-phase issuance: insert the placeholder, sign the assigned id,
    /// patch the signature in.
    ///
    /// The default runs two independent writes, so a `PENDING` row is
    /// briefly observable. Stores that can do better should override this
    /// to make both writes one transaction.
    fn insert_signed<F>(
        &self,
        placeholder: &NewTicket,
        sign: F,
    ) -> impl Future<Output = Result<Option<Ticket>, DatabaseError>> + Send
    where
        F: FnOnce(i64) -> String + Send,
    {
        async move {
            let Some(id) = self.insert_ticket(placeholder).await? else {
                return Ok(None);
            };

            let ticket = Ticket {
                id,
                signature: sign(id),
                max_usage: placeholder.max_usage,
                created_at: placeholder.created_at,
            };
            self.update_ticket(&ticket).await?;

            Ok(Some(ticket))
        }
    }
}

/// Append-only audit log of validation attempts.
pub trait ScanLogStore: Send + Sync {
    /// Append an entry; ignore-on-duplicate like [`TicketStore::insert_ticket`].
    fn insert_scan_log(
        &self,
        entry: &NewScanLog,
    ) -> impl Future<Output = Result<Option<i64>, DatabaseError>> + Send;

    /// Number of entries for `ticket_id` with `is_valid = true`.
    fn count_valid_uses(
        &self,
        ticket_id: i64,
    ) -> impl Future<Output = Result<i64, DatabaseError>> + Send;

    /// All entries, most recent first.
    fn list_scan_logs(&self) -> impl Future<Output = Result<Vec<ScanLog>, DatabaseError>> + Send;
}
