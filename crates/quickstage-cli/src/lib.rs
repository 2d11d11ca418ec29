//! `QuickStage` CLI Library
//!
//! Operator surface over the gate: issue tickets, validate scanned
//! payloads, and inspect tickets and the scan audit log. Rendering a
//! payload into a 2-D code and decoding camera frames happen elsewhere;
//! this crate only deals in payload text.

pub mod fmt;
pub mod issue_cmd;
pub mod log_cmd;
pub mod prompt;
pub mod scan_cmd;
pub mod ticket_cmd;
