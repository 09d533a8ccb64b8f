//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! PBKDF2 stretches the master password with a per-keychain random
//! salt.  The iteration count is fixed: it is not stored in the
//! serialized keychain, so every keychain ever written uses the same
//! work factor.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use super::keys::MasterKey;
use crate::errors::{KeychainError, Result};

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived master key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Number of PBKDF2 iterations.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derive the master key from a password and salt.
///
/// The same password + salt will always produce the same key.
pub fn derive_master_key(password: &[u8], salt: &[u8]) -> Result<MasterKey> {
    if salt.is_empty() {
        return Err(KeychainError::KeyDerivationFailed(
            "salt must not be empty".into(),
        ));
    }

    let mut key = MasterKey::zeroed();
    pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, key.as_mut_bytes());
    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
