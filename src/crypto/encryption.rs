//! AES-256-GCM authenticated encryption with associated data.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! returns it next to the ciphertext.  The caller stores both and hands
//! them back to `decrypt` together with the same associated data.

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{KeychainError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Output of a single encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with the 16-byte tag appended.
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` with a 32-byte `key`, binding `aad` to the tag.
pub fn encrypt(key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Sealed> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| KeychainError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| KeychainError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(&nonce);

    Ok(Sealed {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypt data that was produced by `encrypt`.
///
/// Any failure (bad nonce length, wrong key, wrong `aad`, modified
/// ciphertext) is reported as `EntryTampered`; no plaintext escapes.
pub fn decrypt(key: &[u8], nonce: &[u8], ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_LEN || ciphertext.len() < TAG_LEN {
        return Err(KeychainError::EntryTampered);
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| KeychainError::EntryTampered)?;

    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| KeychainError::EntryTampered)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x5A; 32];

    #[test]
    fn roundtrip_with_aad() {
        let sealed = encrypt(&KEY, b"hunter2", b"fp-1").unwrap();
        assert_eq!(sealed.ciphertext.len(), 7 + TAG_LEN);
        let plain = decrypt(&KEY, &sealed.nonce, &sealed.ciphertext, b"fp-1").unwrap();
        assert_eq!(plain, b"hunter2");
    }

    #[test]
    fn wrong_aad_fails() {
        let sealed = encrypt(&KEY, b"hunter2", b"fp-1").unwrap();
        let err = decrypt(&KEY, &sealed.nonce, &sealed.ciphertext, b"fp-2").unwrap_err();
        assert!(matches!(err, KeychainError::EntryTampered));
    }

    #[test]
    fn fresh_nonce_each_call() {
        let a = encrypt(&KEY, b"same", b"aad").unwrap();
        let b = encrypt(&KEY, b"same", b"aad").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn short_nonce_or_ciphertext_fails() {
        let sealed = encrypt(&KEY, b"x", b"").unwrap();
        assert!(decrypt(&KEY, &sealed.nonce[..8], &sealed.ciphertext, b"").is_err());
        assert!(decrypt(&KEY, &sealed.nonce, &sealed.ciphertext[..4], b"").is_err());
    }
}
