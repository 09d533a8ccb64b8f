//! Sub-key derivation by labeled HMAC-SHA256.
//!
//! From the master key we derive:
//! - a **fingerprint key** that maps domain names to lookup keys,
//! - a **content key** for AES-256-GCM,
//! - the **check value** used to validate a candidate password.
//!
//! Each one is `HMAC-SHA256(master_key, label)` with a distinct fixed
//! label, so no derived value helps forge another and the master key
//! itself never touches a ciphertext.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

use super::kdf::KEY_LEN;
use crate::errors::{KeychainError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Label for the domain-fingerprint key.
pub const FINGERPRINT_LABEL: &[u8] = b"domain-key-derive";

/// Label for the content-encryption key.
pub const CONTENT_LABEL: &[u8] = b"aes-key-derive";

/// Label for the password check value.
pub const CHECK_LABEL: &[u8] = b"master-check";

/// Length of an HMAC-SHA256 output in bytes.
pub const MAC_LEN: usize = 32;

/// The PBKDF2 output.  Zeroed when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub(crate) fn zeroed() -> Self {
        Self {
            bytes: [0u8; KEY_LEN],
        }
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_LEN] {
        &mut self.bytes
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive a sub-key for the given purpose label.
    pub fn derive_subkey(&self, label: &[u8]) -> Result<SubKey> {
        Ok(SubKey {
            bytes: hmac_sha256(&self.bytes, label)?,
        })
    }

    /// Compute the password check value.
    ///
    /// Depends on nothing but the master key, so a password can be
    /// validated without decrypting a single entry.
    pub fn check_value(&self) -> Result<[u8; MAC_LEN]> {
        hmac_sha256(&self.bytes, CHECK_LABEL)
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// A purpose-bound key derived from the master key.  Zeroed when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SubKey {
    bytes: [u8; MAC_LEN],
}

impl SubKey {
    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; MAC_LEN] {
        &self.bytes
    }

    /// `HMAC-SHA256(self, message)`.
    pub fn mac(&self, message: &[u8]) -> Result<[u8; MAC_LEN]> {
        hmac_sha256(&self.bytes, message)
    }
}

impl fmt::Debug for SubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SubKey([REDACTED])")
    }
}

/// Session key material held by an open keychain.
#[derive(Debug)]
pub struct KeySet {
    /// Maps domain names to fingerprints.
    pub fingerprint: SubKey,
    /// Encrypts and decrypts entries.
    pub content: SubKey,
}

impl KeySet {
    /// Derive both session keys from the master key.
    pub fn derive(master: &MasterKey) -> Result<Self> {
        Ok(Self {
            fingerprint: master.derive_subkey(FINGERPRINT_LABEL)?,
            content: master.derive_subkey(CONTENT_LABEL)?,
        })
    }
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<[u8; MAC_LEN]> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| KeychainError::KeyDerivationFailed(format!("HMAC init failed: {e}")))?;
    mac.update(message);

    let mut out = [0u8; MAC_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}
