//! Serialized keychain format and digest verification.
//!
//! A keychain serializes to a single JSON document:
//!
//! ```text
//! {"salt":"<b64>","kvs":{"<b64 fingerprint>":{"iv":"<b64>","ct":"<b64>"}},"check":"<b64>"}
//! ```
//!
//! - **salt**: the 16-byte PBKDF2 salt.
//! - **kvs**: fingerprint -> encrypted entry, sorted by fingerprint so the
//!   same state always produces the same bytes.
//! - **check**: the password check value.
//!
//! The digest is the base64 SHA-256 of the exact JSON bytes.  It is
//! computed and verified over raw bytes, never over a re-serialization.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::errors::{KeychainError, Result};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single encrypted entry, kept in its stored base64 form.
///
/// Decoding is deferred to `Keychain::get`, so a corrupted entry only
/// affects lookups of its own domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// AES-GCM nonce.
    pub iv: String,

    /// Ciphertext + tag of the padded secret.
    pub ct: String,
}

impl Entry {
    /// Encode a nonce and ciphertext for storage.
    pub fn seal(nonce: &[u8], ciphertext: &[u8]) -> Self {
        Self {
            iv: BASE64.encode(nonce),
            ct: BASE64.encode(ciphertext),
        }
    }

    /// Decode the stored nonce and ciphertext.
    ///
    /// Text that is not valid base64 is reported as `EntryTampered`.
    pub fn open(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let iv = BASE64
            .decode(&self.iv)
            .map_err(|_| KeychainError::EntryTampered)?;
        let ct = BASE64
            .decode(&self.ct)
            .map_err(|_| KeychainError::EntryTampered)?;
        Ok((iv, ct))
    }
}

/// The output of a dump: the serialized keychain and its digest.
///
/// Stores persist both together and hand both back to `load`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub blob: String,
    pub digest: String,
}

/// Parsed, not yet authenticated contents of a serialized keychain.
#[derive(Debug)]
pub struct RawKeychain {
    pub salt: Vec<u8>,
    pub entries: BTreeMap<String, Entry>,
    pub check: Vec<u8>,
}

#[derive(Serialize)]
struct Repr<'a> {
    #[serde(serialize_with = "base64_encode")]
    salt: &'a [u8],
    kvs: &'a BTreeMap<String, Entry>,
    #[serde(serialize_with = "base64_encode")]
    check: &'a [u8],
}

// Every field optional so a missing one is reported by name rather
// than as a generic JSON error.
#[derive(Deserialize)]
struct PartialRepr {
    #[serde(default)]
    salt: Option<String>,
    #[serde(default)]
    kvs: Option<BTreeMap<String, Entry>>,
    #[serde(default)]
    check: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Serialize keychain state and compute its digest.
pub fn serialize(salt: &[u8], entries: &BTreeMap<String, Entry>, check: &[u8]) -> Result<Snapshot> {
    let blob = serde_json::to_string(&Repr {
        salt,
        kvs: entries,
        check,
    })
    .map_err(|e| KeychainError::SerializationError(format!("keychain: {e}")))?;

    let digest = digest(blob.as_bytes());
    Ok(Snapshot { blob, digest })
}

/// Parse a serialized keychain.
///
/// Requires non-empty `salt` and `check`; a missing `kvs` means no entries.
pub fn parse(blob: &str) -> Result<RawKeychain> {
    let partial: PartialRepr = serde_json::from_str(blob)
        .map_err(|e| KeychainError::InvalidFormat(format!("keychain JSON: {e}")))?;

    let salt = decode_required(partial.salt, "salt")?;
    let check = decode_required(partial.check, "check")?;

    Ok(RawKeychain {
        salt,
        entries: partial.kvs.unwrap_or_default(),
        check,
    })
}

/// Base64 SHA-256 over `bytes`.
pub fn digest(bytes: &[u8]) -> String {
    BASE64.encode(Sha256::digest(bytes))
}

/// Verify that `blob` hashes to `expected`, in constant time.
pub fn verify_digest(blob: &str, expected: &str) -> Result<()> {
    let actual = digest(blob.as_bytes());
    if actual.as_bytes().ct_eq(expected.as_bytes()).into() {
        Ok(())
    } else {
        Err(KeychainError::DigestMismatch)
    }
}

fn decode_required(field: Option<String>, name: &str) -> Result<Vec<u8>> {
    let encoded = field
        .filter(|s| !s.is_empty())
        .ok_or_else(|| KeychainError::InvalidFormat(format!("{name} missing")))?;

    BASE64
        .decode(encoded)
        .map_err(|e| KeychainError::InvalidFormat(format!("{name} is not valid base64: {e}")))
}

// ---------------------------------------------------------------------------
// Serde helper for base64-encoded byte fields
// ---------------------------------------------------------------------------

pub(crate) fn base64_encode<T, S>(data: T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data.as_ref()))
}
