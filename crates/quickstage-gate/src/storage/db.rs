//! Database connection and initialization.

pub use quickstage_core::db::DatabaseError;

quickstage_core::define_database!(Database, "Ticket database migrations complete");
