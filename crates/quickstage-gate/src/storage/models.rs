//! Database models for the `QuickStage` gate.

use quickstage_crypto::{PENDING_SIGNATURE, TicketPayload};
use serde::{Deserialize, Serialize};

/// Ticket id recorded on audit entries whose payload never resolved to an id.
pub const UNRESOLVED_TICKET_ID: i64 = -1;

/// Ticket record from the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    pub id: i64,
    pub signature: String,
    pub max_usage: i64,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl Ticket {
    /// Whether the signature patch has not been applied yet.
    pub fn is_pending(&self) -> bool {
        self.signature == PENDING_SIGNATURE
    }

    /// The payload to render into a scannable code, once signed.
    pub fn payload(&self) -> Option<TicketPayload> {
        (!self.is_pending()).then(|| TicketPayload {
            ticket_id: self.id,
            signature: self.signature.clone(),
        })
    }
}

/// Placeholder written in the first phase of issuance. The store assigns
/// the id and the signature starts as `PENDING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTicket {
    pub max_usage: i64,
    pub created_at: i64,
}

/// Scan audit record from the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScanLog {
    pub id: i64,
    pub ticket_id: i64,
    /// Unix milliseconds.
    pub scanned_at: i64,
    pub is_valid: bool,
    pub message: String,
}

/// Audit entry to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScanLog {
    pub ticket_id: i64,
    pub scanned_at: i64,
    pub is_valid: bool,
    pub message: String,
}

/// A ticket together with how many valid scans it has had.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TicketUsage {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ticket: Ticket,
    pub valid_uses: i64,
}

impl TicketUsage {
    pub const fn remaining(&self) -> i64 {
        let left = self.ticket.max_usage - self.valid_uses;
        if left > 0 { left } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(signature: &str) -> Ticket {
        Ticket {
            id: 4,
            signature: signature.to_string(),
            max_usage: 2,
            created_at: 0,
        }
    }

    #[test]
    fn pending_ticket_has_no_payload() {
        let t = ticket(PENDING_SIGNATURE);
        assert!(t.is_pending());
        assert!(t.payload().is_none());
    }

    #[test]
    fn signed_ticket_payload_uses_id_and_signature() {
        let t = ticket("abc123");
        assert_eq!(t.payload().map(|p| p.to_string()).as_deref(), Some("4.abc123"));
    }

    #[test]
    fn remaining_never_negative() {
        let usage = TicketUsage {
            ticket: ticket("abc"),
            valid_uses: 5,
        };
        assert_eq!(usage.remaining(), 0);
    }
}
