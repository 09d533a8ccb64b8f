//! Blob stores — persistence for serialized keychains.
//!
//! A store keeps exactly one `Snapshot` (blob + digest) per account and
//! never looks inside it.  Replacing a snapshot is a compare-and-swap on
//! the digest the caller last loaded, so two concurrent
//! load-mutate-persist cycles cannot silently overwrite each other.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::errors::{KeychainError, Result};
use crate::vault::Snapshot;

/// Longest account identifier accepted.
const MAX_ACCOUNT_LEN: usize = 254;

/// Storage for one keychain snapshot per account.
pub trait BlobStore {
    /// Fetch the stored snapshot, or `None` if the account does not exist.
    fn fetch(&self, account: &str) -> Result<Option<Snapshot>>;

    /// Store the first snapshot for a new account.
    ///
    /// Fails with `AccountExists` if the account already has one.
    fn create(&self, account: &str, snapshot: &Snapshot) -> Result<()>;

    /// Replace the snapshot, but only if the stored digest still equals
    /// `expected_digest`.
    ///
    /// Fails with `AccountNotFound` or `Conflict`; on failure nothing
    /// is written.
    fn replace(&self, account: &str, expected_digest: &str, snapshot: &Snapshot) -> Result<()>;
}

/// Validate an account identifier.
///
/// Allowed: ASCII letters, digits, and `.`, `_`, `@`, `+`, `-`, so
/// that email addresses work and the name is safe as a file name.
pub fn validate_account(account: &str) -> Result<()> {
    if account.is_empty() {
        return Err(KeychainError::InvalidArgument(
            "account cannot be empty".into(),
        ));
    }
    if account.len() > MAX_ACCOUNT_LEN {
        return Err(KeychainError::InvalidArgument(format!(
            "account cannot exceed {MAX_ACCOUNT_LEN} characters"
        )));
    }
    if !account
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'@' | b'+' | b'-'))
    {
        return Err(KeychainError::InvalidArgument(format!(
            "account '{account}' contains invalid characters — only ASCII letters, digits, '.', '_', '@', '+' and '-' are allowed"
        )));
    }
    if account.starts_with('.') {
        return Err(KeychainError::InvalidArgument(format!(
            "account '{account}' cannot start with a period"
        )));
    }
    Ok(())
}
