//! Scan outcomes and the operator-facing status.

use quickstage_crypto::PayloadError;
use serde::Serialize;

/// Message recorded for an admitted scan.
pub const SUCCESS_MESSAGE: &str = "Success";

/// Why a scan was refused.
///
/// The `Display` strings are the audit-log messages and part of the
/// observable contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// `Invalid format` or `Invalid ID`.
    #[error(transparent)]
    Malformed(#[from] PayloadError),

    #[error("Invalid Hash")]
    InvalidHash,

    #[error("Ticket not found in DB")]
    NotFound,

    #[error("Usage limit exceeded")]
    UsageLimitExceeded,

    /// Infrastructure failure (store error or timeout).
    #[error("Error processing: {0}")]
    Processing(String),
}

/// Terminal result of one validation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Admitted { ticket_id: i64 },
    Rejected { ticket_id: i64, reason: Rejection },
}

impl ScanOutcome {
    /// The ticket id logged with this outcome; `-1` when unresolved.
    pub const fn ticket_id(&self) -> i64 {
        match self {
            Self::Admitted { ticket_id } | Self::Rejected { ticket_id, .. } => *ticket_id,
        }
    }

    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }

    pub const fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Admitted { .. } => None,
            Self::Rejected { reason, .. } => Some(reason),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Admitted { .. } => SUCCESS_MESSAGE.to_string(),
            Self::Rejected { reason, .. } => reason.to_string(),
        }
    }

    /// The status to present to the operator.
    pub fn status(&self) -> ScanStatus {
        if self.is_valid() {
            ScanStatus::Success(self.message())
        } else {
            ScanStatus::Error(self.message())
        }
    }
}

/// Operator-facing scan status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ScanStatus {
    #[default]
    Idle,
    Success(String),
    Error(String),
}

impl ScanStatus {
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_messages_are_exact() {
        assert_eq!(
            Rejection::from(PayloadError::InvalidFormat).to_string(),
            "Invalid format"
        );
        assert_eq!(
            Rejection::from(PayloadError::InvalidId).to_string(),
            "Invalid ID"
        );
        assert_eq!(Rejection::InvalidHash.to_string(), "Invalid Hash");
        assert_eq!(Rejection::NotFound.to_string(), "Ticket not found in DB");
        assert_eq!(
            Rejection::UsageLimitExceeded.to_string(),
            "Usage limit exceeded"
        );
        assert_eq!(
            Rejection::Processing("disk I/O error".to_string()).to_string(),
            "Error processing: disk I/O error"
        );
    }

    #[test]
    fn admitted_outcome_presents_success() {
        let outcome = ScanOutcome::Admitted { ticket_id: 3 };
        assert!(outcome.is_valid());
        assert_eq!(outcome.ticket_id(), 3);
        assert_eq!(outcome.status(), ScanStatus::Success("Success".to_string()));
    }

    #[test]
    fn rejected_outcome_presents_error() {
        let outcome = ScanOutcome::Rejected {
            ticket_id: -1,
            reason: Rejection::Malformed(PayloadError::InvalidFormat),
        };
        assert!(!outcome.is_valid());
        assert_eq!(
            outcome.status(),
            ScanStatus::Error("Invalid format".to_string())
        );
    }
}
