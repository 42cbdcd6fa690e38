//! HMAC-SHA512 request and notification signing.
//!
//! Every API request carries an `HMAC` header holding the lowercase hex
//! HMAC-SHA512 of the exact encoded request body, keyed by the account's
//! private key. Inbound notifications are signed the same way with the IPN
//! secret.

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Computes the lowercase hex HMAC-SHA512 of `message` keyed by `secret`.
#[must_use]
pub fn sign(secret: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `signature` (hex, either case) against the HMAC-SHA512 of `message`.
///
/// The digest comparison is constant-time.
#[must_use]
pub fn verify(secret: &[u8], message: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let mut mac = HmacSha512::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message);
    mac.verify_slice(&expected).is_ok()
}

/// A signing key held for the lifetime of a client.
///
/// The key material never appears in `Debug` output.
#[derive(Clone)]
pub struct Signer {
    secret: Vec<u8>,
}

impl Signer {
    /// Creates a signer from raw key material.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Signs `message`, returning the lowercase hex digest.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> String {
        sign(&self.secret, message)
    }

    /// Verifies a hex `signature` over `message`.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &str) -> bool {
        verify(&self.secret, message, signature)
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_is_reproducible() {
        let a = sign(b"private", b"cmd=balances&key=public");
        let b = sign(b"private", b"cmd=balances&key=public");
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_is_lowercase_hex_sha512() {
        let digest = sign(b"private", b"message");
        assert_eq!(digest.len(), 128);
        assert!(
            digest
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn test_sign_known_vector() {
        // RFC 4231 test case 2.
        let digest = sign(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            digest,
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    #[test]
    fn test_one_byte_change_in_message_changes_digest() {
        let a = sign(b"private", b"amount=10");
        let b = sign(b"private", b"amount=11");
        assert_ne!(a, b);
    }

    #[test]
    fn test_one_byte_change_in_secret_changes_digest() {
        let a = sign(b"private-a", b"amount=10");
        let b = sign(b"private-b", b"amount=10");
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_accepts_matching_signature() {
        let signer = Signer::new("ipn-secret");
        let sig = signer.sign(b"txn_id=T1&status=100");
        assert!(signer.verify(b"txn_id=T1&status=100", &sig));
        assert!(signer.verify(b"txn_id=T1&status=100", &sig.to_uppercase()));
    }

    #[test]
    fn test_verify_rejects_tampered_body_or_garbage() {
        let signer = Signer::new("ipn-secret");
        let sig = signer.sign(b"txn_id=T1&status=100");
        assert!(!signer.verify(b"txn_id=T1&status=101", &sig));
        assert!(!signer.verify(b"txn_id=T1&status=100", "not-hex"));
        assert!(!signer.verify(b"txn_id=T1&status=100", ""));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let signer = Signer::new("super-secret");
        assert!(!format!("{signer:?}").contains("super-secret"));
    }
}
