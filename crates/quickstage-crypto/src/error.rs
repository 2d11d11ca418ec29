//! Payload parsing errors.

/// Why a scanned string is not a ticket payload.
///
/// The `Display` strings are recorded verbatim in the scan audit log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// The text does not split into exactly two parts on `.`.
    #[error("Invalid format")]
    InvalidFormat,

    /// The id part is not a decimal integer.
    #[error("Invalid ID")]
    InvalidId,
}
