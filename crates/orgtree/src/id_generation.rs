//! Account uid generation and password hashing.
//!
//! Account uids are 20-character base36 strings derived from a SHA256 hash of
//! the account email, the current time, and a retry nonce. Passwords are
//! stored as `sha256$<salt>$<hex digest>`.
//!
//! The password hash is a placeholder for the hashing done by the external
//! authentication service, which owns real credential storage. It is a single
//! salted SHA-256 round and is not a password KDF: it only lets the
//! store-backed directory check a login it created itself.
//!
//! # Example
//!
//! ```
//! use orgtree::id_generation::{hash_password, verify_password, UidGenerator};
//!
//! let mut generator = UidGenerator::new();
//! let uid = generator.generate("admin@example.com").unwrap();
//! assert_eq!(uid.len(), 20);
//!
//! let stored = hash_password("correct horse battery");
//! assert!(verify_password("correct horse battery", &stored));
//! ```

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;

static SALT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Length of a generated account uid.
pub const UID_LENGTH: usize = 20;

/// Scheme tag prefixed to stored password hashes.
pub const PASSWORD_SCHEME: &str = "sha256";

/// Errors that can occur during uid generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Every nonce produced a uid that is already taken
    #[error("Unable to generate unique uid after {attempts} attempts")]
    CollisionExhausted { attempts: u32 },

    /// Invalid length parameter
    #[error("Length must be greater than 0")]
    InvalidLength,
}

/// Hash-based account uid generator with collision detection.
#[derive(Debug, Default)]
pub struct UidGenerator {
    existing: HashSet<String>,
}

impl UidGenerator {
    /// Create a generator with no known uids.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing uid to prevent collisions
    pub fn register(&mut self, uid: impl Into<String>) {
        self.existing.insert(uid.into());
    }

    /// Generate a new unique uid for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if every nonce collides with a registered uid.
    pub fn generate(&mut self, email: &str) -> Result<String, IdGenerationError> {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();

        for nonce in 0..MAX_NONCE {
            let digest = sha256(format!("{email}|{timestamp}|{nonce}").as_bytes());
            let uid = encode_base36(&digest[..16], UID_LENGTH)?;

            if self.existing.insert(uid.clone()) {
                if nonce > 0 {
                    debug!(nonce, "Generated unique uid after {} collision retries", nonce);
                }
                return Ok(uid);
            }
        }

        Err(IdGenerationError::CollisionExhausted {
            attempts: MAX_NONCE,
        })
    }
}

/// Hash a password with a fresh salt.
///
/// One salted SHA-256 round. Not suitable for storing passwords outside the
/// store-backed directory.
pub fn hash_password(password: &str) -> String {
    let seed = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let sequence = SALT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let salt = hex(&sha256(format!("{seed}|{sequence}|{}", std::process::id()).as_bytes())[..8]);
    hash_with_salt(password, &salt)
}

/// Check a password against a stored `sha256$<salt>$<hex>` hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(PASSWORD_SCHEME), Some(salt), Some(_)) => hash_with_salt(password, salt) == stored,
        _ => false,
    }
}

fn hash_with_salt(password: &str, salt: &str) -> String {
    let digest = sha256(format!("{salt}{password}").as_bytes());
    format!("{PASSWORD_SCHEME}${salt}${}", hex(&digest))
}

fn sha256(bytes: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().to_vec()
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Encode up to 16 bytes as a fixed-length base36 string.
///
/// Bytes beyond the first 16 are folded in with wrapping arithmetic, so the
/// output stays deterministic for any input.
fn encode_base36(bytes: &[u8], length: usize) -> Result<String, IdGenerationError> {
    if length == 0 {
        return Err(IdGenerationError::InvalidLength);
    }

    let mut num: u128 = 0;
    for &byte in bytes {
        num = num.wrapping_shl(8).wrapping_add(u128::from(byte));
    }

    let mut result = Vec::with_capacity(length);
    while result.len() < length {
        result.push(char::from(BASE36_CHARS[(num % 36) as usize]));
        num /= 36;
    }
    result.reverse();

    Ok(result.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_is_fixed_length_and_alphanumeric() {
        let encoded = encode_base36(&[0xff; 16], UID_LENGTH).unwrap();
        assert_eq!(encoded.len(), UID_LENGTH);
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));

        assert_eq!(encode_base36(&[0], 3).unwrap(), "000");
        assert_eq!(encode_base36(&[36], 2).unwrap(), "10");
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(matches!(
            encode_base36(&[1], 0),
            Err(IdGenerationError::InvalidLength)
        ));
    }

    #[test]
    fn repeated_generation_never_collides() {
        let mut generator = UidGenerator::new();
        let a = generator.generate("admin@example.com").unwrap();
        let b = generator.generate("admin@example.com").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn password_round_trip() {
        let stored = hash_password("hunter2hunter2");
        assert!(stored.starts_with("sha256$"));
        assert_eq!(stored.split('$').count(), 3);
        assert!(verify_password("hunter2hunter2", &stored));
        assert!(!verify_password("hunter3hunter3", &stored));
    }

    #[test]
    fn known_salt_produces_known_digest() {
        let stored = hash_with_salt("", "");
        assert_eq!(
            stored,
            "sha256$$e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let first = hash_password("same password");
        let second = hash_password("same password");
        assert_ne!(first, second);
        assert!(verify_password("same password", &first));
        assert!(verify_password("same password", &second));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("pw", "plain"));
        assert!(!verify_password("pw", "md5$salt$abc"));
    }
}
