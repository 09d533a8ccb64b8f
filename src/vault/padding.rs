//! Fixed-width zero padding for secret values.
//!
//! Every secret is encrypted as exactly `MAX_SECRET_LEN` bytes, so the
//! stored ciphertext length says nothing about the secret's length.

use zeroize::Zeroizing;

use crate::errors::{KeychainError, Result};

/// Width of every padded secret in bytes.
pub const MAX_SECRET_LEN: usize = 64;

/// Zero-pad the UTF-8 bytes of `secret` to `MAX_SECRET_LEN`.
///
/// Secrets that do not fit, or whose last byte is NUL (which `unpad`
/// could not distinguish from padding), are rejected.
pub fn pad(secret: &str) -> Result<Zeroizing<Vec<u8>>> {
    let bytes = secret.as_bytes();
    if bytes.len() > MAX_SECRET_LEN {
        return Err(KeychainError::SecretTooLong(bytes.len(), MAX_SECRET_LEN));
    }
    if bytes.last() == Some(&0) {
        return Err(KeychainError::InvalidArgument(
            "secret cannot end with a NUL character".into(),
        ));
    }

    let mut buf = Zeroizing::new(vec![0u8; MAX_SECRET_LEN]);
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(buf)
}

/// Strip trailing zero bytes.
pub fn unpad(buf: &[u8]) -> &[u8] {
    let end = buf.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &buf[..end]
}
