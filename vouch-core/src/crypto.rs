//! Cryptographic utilities for the access-code flow
//!
//! Codes are short-lived 6-digit secrets, so they are never persisted in the
//! clear: storage keeps a SHA-256 digest bound to the endorsement, the email,
//! and a server-side pepper. Binding the digest to its context means a leaked
//! hash cannot be replayed against a different record or address, and the
//! pepper keeps the 10^6 code space from being brute-forced offline from a
//! stolen challenge row.
//!
//! All digest and signature comparisons in this subsystem go through
//! [`constant_time_compare`], never `==`.

use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Number of digits in a generated access code.
pub const ACCESS_CODE_LENGTH: usize = 6;

const CODE_SPACE: u32 = 1_000_000;

/// Generate a uniformly random 6-digit access code, zero-padded (`"004821"`).
///
/// # Panics
///
/// Panics if the OS random number generator fails. This indicates a critical
/// system failure (e.g., /dev/urandom unavailable) from which recovery is not
/// possible for security-sensitive operations.
pub fn generate_access_code() -> String {
    // Rejection sampling keeps the distribution uniform over the code space.
    let zone = u32::MAX - (u32::MAX % CODE_SPACE);
    loop {
        let raw = OsRng
            .try_next_u32()
            .expect("OS RNG failure - system entropy source unavailable");
        if raw < zone {
            return format!("{:06}", raw % CODE_SPACE);
        }
    }
}

/// Derive the stored digest for an access code.
///
/// The digest is a function of `(endorsement_id, email, code, pepper)`; the
/// same code sent for a different record or address hashes differently.
///
/// # Returns
///
/// A hex-encoded SHA-256 digest.
pub fn hash_access_code(endorsement_id: &str, email: &str, code: &str, pepper: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(endorsement_id.as_bytes());
    hasher.update(b"\n");
    hasher.update(email.as_bytes());
    hasher.update(b"\n");
    hasher.update(code.as_bytes());
    hasher.update(b"\n");
    hasher.update(pepper);
    hex::encode(hasher.finalize())
}

/// Verify a candidate code against a stored digest in constant time.
pub fn verify_access_code_hash(
    endorsement_id: &str,
    email: &str,
    code: &str,
    pepper: &[u8],
    stored_hash: &str,
) -> bool {
    let computed = hash_access_code(endorsement_id, email, code, pepper);
    constant_time_compare(computed.as_bytes(), stored_hash.as_bytes())
}

/// Timing-safe equality for two byte slices.
///
/// Length mismatch returns `false` before any byte comparison; the byte
/// comparison itself runs in constant time via the `subtle` crate.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_access_code_format() {
        for _ in 0..100 {
            let code = generate_access_code();
            assert_eq!(code.len(), ACCESS_CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_access_code_varies() {
        // Collisions over 20 draws from a 10^6 space are possible but so
        // unlikely that identical output indicates a broken generator.
        let codes: std::collections::HashSet<String> =
            (0..20).map(|_| generate_access_code()).collect();
        assert!(codes.len() > 1);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let a = hash_access_code("end_1", "user@example.com", "123456", b"pepper");
        let b = hash_access_code("end_1", "user@example.com", "123456", b"pepper");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_produces_hex_digest() {
        let hash = hash_access_code("end_1", "user@example.com", "123456", b"pepper");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_binds_all_inputs() {
        let base = hash_access_code("end_1", "user@example.com", "123456", b"pepper");

        assert_ne!(
            base,
            hash_access_code("end_2", "user@example.com", "123456", b"pepper")
        );
        assert_ne!(
            base,
            hash_access_code("end_1", "other@example.com", "123456", b"pepper")
        );
        assert_ne!(
            base,
            hash_access_code("end_1", "user@example.com", "654321", b"pepper")
        );
        assert_ne!(
            base,
            hash_access_code("end_1", "user@example.com", "123456", b"cayenne")
        );
    }

    #[test]
    fn test_hash_is_not_plain_code_digest() {
        use sha2::{Digest, Sha256};

        let bound = hash_access_code("end_1", "user@example.com", "123456", b"pepper");
        let plain = hex::encode(Sha256::digest(b"123456"));
        assert_ne!(bound, plain);
    }

    #[test]
    fn test_verify_access_code_hash() {
        let hash = hash_access_code("end_1", "user@example.com", "123456", b"pepper");

        assert!(verify_access_code_hash(
            "end_1",
            "user@example.com",
            "123456",
            b"pepper",
            &hash
        ));
        assert!(!verify_access_code_hash(
            "end_1",
            "user@example.com",
            "123457",
            b"pepper",
            &hash
        ));
        assert!(!verify_access_code_hash(
            "end_9",
            "user@example.com",
            "123456",
            b"pepper",
            &hash
        ));
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare(b"hello", b"hello"));
        assert!(constant_time_compare(b"", b""));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare(b"hello", b"world"));
        assert!(!constant_time_compare(b"a", b"b"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare(b"short", b"longer_string"));
        assert!(!constant_time_compare(b"", b"something"));
    }
}
