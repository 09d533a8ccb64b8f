//! Cryptographic primitives for Keychain.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption with associated data (`encryption`)
//! - PBKDF2-HMAC-SHA256 password stretching (`kdf`)
//! - Labeled HMAC sub-key derivation and zeroizing key types (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

pub use encryption::{decrypt, encrypt, Sealed};
pub use kdf::{derive_master_key, generate_salt};
pub use keys::{KeySet, MasterKey, SubKey};
