//! `QuickStage` Gate Library
//!
//! Issues signed admission tickets and validates scanned payloads against
//! them, recording every attempt in an append-only audit log.
//!
//! - [`storage`]: `SQLite` persistence and the store traits
//! - [`issuer`]: two-phase ticket issuance
//! - [`scan`]: the scan validation state machine and per-ticket locking

pub mod issuer;
pub mod scan;
pub mod storage;

pub use issuer::{IssueError, TicketIssuer};
pub use scan::{Rejection, ScanOutcome, ScanStatus, ScanValidator, TicketLocks};
pub use storage::{Database, DatabaseError, ScanLogStore, TicketStore};
