//! Cryptographic utilities shared across AgriSense crates
//!
//! Provides password hashing and verification using SHA-256 with random
//! salts and constant-time comparison to prevent timing attacks.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Length of the random salt prepended to password hashes, in bytes
const SALT_LEN: usize = 16;

/// Compare two byte slices in constant time.
///
/// Returns `false` immediately on length mismatch; otherwise the
/// comparison touches every byte regardless of where the first
/// difference occurs.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Hash a password with a fresh random salt.
///
/// The stored hash format is `hex(salt):hex(sha256(password || salt))`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt);
    let hash = hasher.finalize();

    format!("{}:{}", hex::encode(salt), hex::encode(hash))
}

/// Verify a password against a stored hash using constant-time comparison.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    let parts: Vec<&str> = stored_hash.split(':').collect();
    if parts.len() != 2 {
        return false;
    }

    let salt = match hex::decode(parts[0]) {
        Ok(salt) => salt,
        Err(_) => return false,
    };

    let hash = match hex::decode(parts[1]) {
        Ok(hash) => hash,
        Err(_) => return false,
    };

    let mut hasher = Sha256::new();
    hasher.update(candidate.as_bytes());
    hasher.update(&salt);
    let candidate_hash = hasher.finalize();

    constant_time_eq(&hash, &candidate_hash)
}
