//! Vault module — the encrypted keychain.
//!
//! This module provides:
//! - Fixed-width secret padding (`padding`)
//! - Serialized keychain format with SHA-256 digest (`format`)
//! - The `Keychain` type with init/load/dump and set/get/remove (`keychain`)

pub mod format;
pub mod keychain;
pub mod padding;

pub use format::{Entry, Snapshot};
pub use keychain::Keychain;
pub use padding::MAX_SECRET_LEN;
