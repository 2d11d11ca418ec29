//! `QuickStage` ticket signing library
//!
//! A ticket is authenticated by a keyed digest of its store-assigned id and
//! the operator's admin secret. The digest travels inside the scannable
//! payload `"<id>.<signature>"`.
//!
//! ## Primitives
//!
//! - **Secret**: [`AdminSecret`], a zeroizing passphrase held for one session
//! - **Signature**: SHA-256 over the UTF-8 bytes of `"<id>:<secret>"`, lowercase hex
//! - **Payload**: [`TicketPayload`], the exact string shape carried by a code

pub mod error;
pub mod payload;
pub mod secret;
pub mod signature;

pub use error::PayloadError;
pub use payload::{PAYLOAD_SEPARATOR, TicketPayload};
pub use secret::AdminSecret;
pub use signature::{PENDING_SIGNATURE, signature, verify};
