//! Scan validation.
//!
//! A presented payload is parsed, authenticated against the admin secret,
//! resolved to a stored ticket and checked against the ticket's usage
//! ceiling. Every attempt that gets past the precondition and debounce
//! checks ends with exactly one audit log entry.

mod locks;
mod outcome;
mod validator;

pub use locks::{TicketGuard, TicketLocks};
pub use outcome::{Rejection, SUCCESS_MESSAGE, ScanOutcome, ScanStatus};
pub use validator::ScanValidator;
