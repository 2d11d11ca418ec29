//! The operator's admin secret.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Passphrase that keys every ticket signature.
///
/// Held in memory for one operator session and wiped on drop. It never
/// appears in `Debug` output or logs.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AdminSecret(String);

impl AdminSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AdminSecret").field(&"[REDACTED]").finish()
    }
}

impl From<String> for AdminSecret {
    fn from(secret: String) -> Self {
        Self(secret)
    }
}
