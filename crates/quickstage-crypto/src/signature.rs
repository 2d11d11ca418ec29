//! Ticket signature scheme.
//!
//! `signature(id, secret) = hex(SHA-256("<id>:<secret>"))`. The function is
//! total: any id and any secret, including an empty one, yield a digest.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::secret::AdminSecret;

/// Signature stored on a ticket between its placeholder insert and the
/// signature patch.
pub const PENDING_SIGNATURE: &str = "PENDING";

/// Derive the signature binding `ticket_id` to `secret`.
pub fn signature(ticket_id: i64, secret: &AdminSecret) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ticket_id.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a presented signature against the expected one.
///
/// Exact string equality, compared in constant time.
pub fn verify(ticket_id: i64, secret: &AdminSecret, provided: &str) -> bool {
    let expected = signature(ticket_id, secret);
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_vector() {
        let secret = AdminSecret::new("admin123");
        assert_eq!(
            signature(1, &secret),
            "c2215d433b51b0e546344b8423f2191079eecdc03413bf8f04eaed00427fbc8b"
        );
    }

    #[test]
    fn is_deterministic() {
        let secret = AdminSecret::new("secretPassword");
        assert_eq!(signature(123, &secret), signature(123, &secret));
        assert_eq!(
            signature(123, &secret),
            "84f092de10a04b5d583647c8015f88afb5bd6395e36af77035f4af4f1b07f321"
        );
    }

    #[test]
    fn changes_with_id() {
        let secret = AdminSecret::new("secretPassword");
        assert_ne!(signature(1, &secret), signature(2, &secret));
    }

    #[test]
    fn changes_with_secret() {
        assert_ne!(
            signature(123, &AdminSecret::new("passwordA")),
            signature(123, &AdminSecret::new("passwordB"))
        );
    }

    #[test]
    fn no_collisions_across_small_id_range() {
        let secret = AdminSecret::new("admin123");
        let digests: std::collections::HashSet<String> =
            (-50..500).map(|id| signature(id, &secret)).collect();
        assert_eq!(digests.len(), 550);
    }

    #[test]
    fn empty_secret_and_negative_id_are_accepted() {
        assert_eq!(
            signature(0, &AdminSecret::new("")),
            "ba768b331fd86cec803be04e56ab2b3d4c0e98ef4ee4fcd4e72ad7cce61a1d1f"
        );
        assert_eq!(
            signature(-1, &AdminSecret::new("admin123")),
            "b9b2163537063600ba927288eb1f5fd11afd7334e0685cce0003e9377bde6ea8"
        );
    }

    #[test]
    fn output_is_lowercase_hex() {
        let sig = signature(42, &AdminSecret::new("k"));
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn verify_requires_exact_match() {
        let secret = AdminSecret::new("admin123");
        let sig = signature(7, &secret);

        assert!(verify(7, &secret, &sig));
        assert!(!verify(7, &secret, &sig.to_uppercase()));
        assert!(!verify(7, &secret, &sig[..63]));
        assert!(!verify(8, &secret, &sig));
        assert!(!verify(7, &AdminSecret::new("admin124"), &sig));
        assert!(!verify(7, &secret, ""));
    }
}
