//! The text carried by a scannable ticket: `"<id>.<signature>"`.
//!
//! Decimal integer id, a literal `.`, lowercase hex signature. No whitespace,
//! no version byte.

use std::fmt;
use std::str::FromStr;

use crate::error::PayloadError;
use crate::secret::AdminSecret;
use crate::signature::signature;

pub const PAYLOAD_SEPARATOR: char = '.';

/// A parsed, not yet authenticated, ticket payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketPayload {
    pub ticket_id: i64,
    pub signature: String,
}

impl TicketPayload {
    /// Build the payload a freshly signed ticket should carry.
    pub fn signed(ticket_id: i64, secret: &AdminSecret) -> Self {
        Self {
            ticket_id,
            signature: signature(ticket_id, secret),
        }
    }

    /// Split `text` into id and signature.
    ///
    /// The part count is checked before the id, so `"a.b.c"` is a format
    /// error even though its first part is not numeric either.
    pub fn parse(text: &str) -> Result<Self, PayloadError> {
        let mut parts = text.split(PAYLOAD_SEPARATOR);
        let (Some(id), Some(sig), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(PayloadError::InvalidFormat);
        };

        let ticket_id = id.parse::<i64>().map_err(|_| PayloadError::InvalidId)?;

        Ok(Self {
            ticket_id,
            signature: sig.to_string(),
        })
    }
}

impl FromStr for TicketPayload {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TicketPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{PAYLOAD_SEPARATOR}{}", self.ticket_id, self.signature)
    }
}
