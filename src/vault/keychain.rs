//! The keychain: a password-derived, point-lookup store of per-domain
//! secrets.
//!
//! `Keychain` wraps the crypto layer and the format layer so that
//! callers only deal with `init`/`load`, `set`/`get`/`remove`, and
//! `dump`.  Domain names never appear in the stored state: entries are
//! keyed by `HMAC(fingerprint_key, domain)`, and that same fingerprint
//! is the associated data of the entry's ciphertext.

use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::crypto::encryption::{decrypt, encrypt};
use crate::crypto::kdf::{derive_master_key, generate_salt};
use crate::crypto::keys::{KeySet, MAC_LEN};
use crate::errors::{KeychainError, Result};

use super::format::{self, Entry, Snapshot};
use super::padding::{pad, unpad};

/// An open keychain.  Create one with `Keychain::init` or
/// `Keychain::load`.
///
/// Not `Clone`: the session keys are owned by exactly one instance and
/// zeroed when it is dropped.
pub struct Keychain {
    /// PBKDF2 salt, fixed at creation.
    salt: Vec<u8>,

    /// base64(fingerprint) -> encrypted entry.
    entries: BTreeMap<String, Entry>,

    /// Password check value, fixed at creation.
    check: [u8; MAC_LEN],

    /// Session keys (zeroized on drop).
    keys: KeySet,
}

impl Keychain {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create an empty keychain protected by `password`.
    pub fn init(password: &str) -> Result<Self> {
        let salt = generate_salt();

        let master = derive_master_key(password.as_bytes(), &salt)?;
        let check = master.check_value()?;
        let keys = KeySet::derive(&master)?;
        drop(master);

        debug!("initialized new keychain");

        Ok(Self {
            salt: salt.to_vec(),
            entries: BTreeMap::new(),
            check,
            keys,
        })
    }

    /// Reconstitute a keychain from a previous `dump`.
    ///
    /// Checks run in a fixed order: the trusted digest (if given) over
    /// the raw bytes, then the structure, then the password check value.
    /// Only when all three pass are the entries adopted.
    pub fn load(password: &str, blob: &str, trusted_digest: Option<&str>) -> Result<Self> {
        // 1. Outer digest, before any parsing.
        if let Some(expected) = trusted_digest {
            format::verify_digest(blob, expected).map_err(|e| {
                warn!("keychain digest mismatch");
                e
            })?;
        }

        // 2. Structure.
        let raw = format::parse(blob)?;

        // 3. Password check, without touching any entry.
        let master = derive_master_key(password.as_bytes(), &raw.salt)?;
        let computed = master.check_value()?;
        if !bool::from(computed.as_slice().ct_eq(&raw.check)) {
            debug!("master password check failed");
            return Err(KeychainError::WrongPassword);
        }

        // 4. Session keys and entries.
        let keys = KeySet::derive(&master)?;
        drop(master);

        debug!(entries = raw.entries.len(), "loaded keychain");

        Ok(Self {
            salt: raw.salt,
            entries: raw.entries,
            check: computed,
            keys,
        })
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Store `secret` under `domain`, replacing any previous value.
    pub fn set(&mut self, domain: &str, secret: &str) -> Result<()> {
        let fingerprint = self.fingerprint(domain)?;
        let padded = pad(secret)?;

        let sealed = encrypt(self.keys.content.as_bytes(), &padded, &fingerprint)?;

        self.entries.insert(
            BASE64.encode(fingerprint),
            Entry::seal(&sealed.nonce, &sealed.ciphertext),
        );
        Ok(())
    }

    /// Look up the secret stored under `domain`.
    ///
    /// Returns `Ok(None)` when there is no entry.  An entry that fails
    /// to decode or authenticate is an `EntryTampered` error.
    pub fn get(&self, domain: &str) -> Result<Option<String>> {
        let fingerprint = self.fingerprint(domain)?;

        let Some(entry) = self.entries.get(&BASE64.encode(fingerprint)) else {
            return Ok(None);
        };

        let plaintext = entry
            .open()
            .and_then(|(iv, ct)| decrypt(self.keys.content.as_bytes(), &iv, &ct, &fingerprint))
            .map(Zeroizing::new)
            .map_err(|e| {
                warn!("entry failed authentication");
                e
            })?;

        let secret = std::str::from_utf8(unpad(&plaintext))
            .map_err(|_| KeychainError::EntryTampered)?
            .to_string();
        Ok(Some(secret))
    }

    /// Delete the entry for `domain`.  Returns whether one existed.
    pub fn remove(&mut self, domain: &str) -> Result<bool> {
        let fingerprint = self.fingerprint(domain)?;
        Ok(self.entries.remove(&BASE64.encode(fingerprint)).is_some())
    }

    /// Returns `true` if an entry exists for `domain`.
    ///
    /// Metadata-only check — nothing is decrypted.
    pub fn contains(&self, domain: &str) -> Result<bool> {
        let fingerprint = self.fingerprint(domain)?;
        Ok(self.entries.contains_key(&BASE64.encode(fingerprint)))
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize the keychain and compute its digest.
    pub fn dump(&self) -> Result<Snapshot> {
        format::serialize(&self.salt, &self.entries, &self.check)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Number of stored entries (including any index entries kept by
    /// higher layers).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the keychain holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The PBKDF2 salt.
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Any string is a valid key here, including the empty one; naming
    /// rules for listed domains live in `index::validate_domain`.
    fn fingerprint(&self, domain: &str) -> Result<[u8; MAC_LEN]> {
        self.keys.fingerprint.mac(domain.as_bytes())
    }
}

impl fmt::Debug for Keychain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keychain")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}
