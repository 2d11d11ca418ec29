//! Database queries for the `QuickStage` gate.

use quickstage_crypto::PENDING_SIGNATURE;

use super::db::{Database, DatabaseError};
use super::models::{NewScanLog, NewTicket, ScanLog, Ticket, TicketUsage};
use super::store::{ScanLogStore, TicketStore};

impl TicketStore for Database {
    async fn insert_ticket(&self, placeholder: &NewTicket) -> Result<Option<i64>, DatabaseError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO tickets (signature, max_usage, created_at) VALUES (?, ?, ?)",
        )
        .bind(PENDING_SIGNATURE)
        .bind(placeholder.max_usage)
        .bind(placeholder.created_at)
        .execute(self.pool())
        .await?;

        Ok((result.rows_affected() > 0).then(|| result.last_insert_rowid()))
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE tickets SET signature = ?, max_usage = ?, created_at = ? WHERE id = ?",
        )
        .bind(&ticket.signature)
        .bind(ticket.max_usage)
        .bind(ticket.created_at)
        .bind(ticket.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Ticket {}", ticket.id)));
        }
        Ok(())
    }

    async fn get_ticket(&self, id: i64) -> Result<Option<Ticket>, DatabaseError> {
        let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(ticket)
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, DatabaseError> {
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(tickets)
    }

    /// Both phases run in one transaction, so other connections never see
    /// a `PENDING` signature.
    async fn insert_signed<F>(
        &self,
        placeholder: &NewTicket,
        sign: F,
    ) -> Result<Option<Ticket>, DatabaseError>
    where
        F: FnOnce(i64) -> String + Send,
    {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            "INSERT OR IGNORE INTO tickets (signature, max_usage, created_at) VALUES (?, ?, ?)",
        )
        .bind(PENDING_SIGNATURE)
        .bind(placeholder.max_usage)
        .bind(placeholder.created_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let id = result.last_insert_rowid();
        let signature = sign(id);

        sqlx::query("UPDATE tickets SET signature = ? WHERE id = ?")
            .bind(&signature)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(Ticket {
            id,
            signature,
            max_usage: placeholder.max_usage,
            created_at: placeholder.created_at,
        }))
    }
}

impl ScanLogStore for Database {
    async fn insert_scan_log(&self, entry: &NewScanLog) -> Result<Option<i64>, DatabaseError> {
        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO scan_logs (ticket_id, scanned_at, is_valid, message)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(entry.ticket_id)
        .bind(entry.scanned_at)
        .bind(entry.is_valid)
        .bind(&entry.message)
        .execute(self.pool())
        .await?;

        Ok((result.rows_affected() > 0).then(|| result.last_insert_rowid()))
    }

    async fn count_valid_uses(&self, ticket_id: i64) -> Result<i64, DatabaseError> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM scan_logs WHERE ticket_id = ? AND is_valid = 1")
                .bind(ticket_id)
                .fetch_one(self.pool())
                .await?;
        Ok(row.0)
    }

    async fn list_scan_logs(&self) -> Result<Vec<ScanLog>, DatabaseError> {
        let logs = sqlx::query_as::<_, ScanLog>(
            "SELECT * FROM scan_logs ORDER BY scanned_at DESC, id DESC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(logs)
    }
}

impl Database {
    // =========================================================================
    // Display queries
    // =========================================================================

    /// Every ticket with its valid-use count, most recently created first.
    pub async fn list_ticket_usage(&self) -> Result<Vec<TicketUsage>, DatabaseError> {
        let rows = sqlx::query_as::<_, TicketUsage>(
            r"
            SELECT t.id, t.signature, t.max_usage, t.created_at, COUNT(s.id) AS valid_uses
            FROM tickets t
            LEFT JOIN scan_logs s ON s.ticket_id = t.id AND s.is_valid = 1
            GROUP BY t.id
            ORDER BY t.created_at DESC, t.id DESC
            ",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// The `limit` most recent audit entries, optionally only those for
    /// one ticket id.
    pub async fn recent_scan_logs(
        &self,
        ticket_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<ScanLog>, DatabaseError> {
        let logs = sqlx::query_as::<_, ScanLog>(
            r"
            SELECT * FROM scan_logs
            WHERE ? IS NULL OR ticket_id = ?
            ORDER BY scanned_at DESC, id DESC
            LIMIT ?
            ",
        )
        .bind(ticket_id)
        .bind(ticket_id)
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await?;

        Ok(logs)
    }

    /// Number of audit entries, optionally only those for one ticket id.
    pub async fn count_scan_logs(&self, ticket_id: Option<i64>) -> Result<i64, DatabaseError> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM scan_logs WHERE ? IS NULL OR ticket_id = ?")
                .bind(ticket_id)
                .bind(ticket_id)
                .fetch_one(self.pool())
                .await?;
        Ok(row.0)
    }
}
