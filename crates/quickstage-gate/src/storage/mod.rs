//! `SQLite` storage for the `QuickStage` gate.
//!
//! Provides persistence for tickets and the scan audit log, plus the store
//! traits the issuer and validator are written against.

mod db;
mod models;
mod queries;
mod store;

pub use db::{Database, DatabaseError};
pub use models::*;
pub use store::{ScanLogStore, TicketStore};
