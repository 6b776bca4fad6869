//! # Password Digests
//!
//! Salted HMAC-SHA256 digests stored as `salt$hex`. Verification compares
//! in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Digest a password under a fresh random salt
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = compute_digest(&salt, password);
    format!("{salt}${digest}")
}

/// Check a password against a stored `salt$hex` digest
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    constant_time_compare(&compute_digest(salt, password), digest)
}

fn compute_digest(salt: &str, password: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(salt.as_bytes()).expect("HMAC can take key of any size");
    mac.update(password.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let stored = hash_password("hunter22");
        assert!(verify_password("hunter22", &stored));
        assert!(!verify_password("hunter23", &stored));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("hunter22"), hash_password("hunter22"));
    }

    #[test]
    fn test_malformed_stored_digest() {
        assert!(!verify_password("hunter22", "no-separator"));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
