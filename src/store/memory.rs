//! In-memory blob store.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{validate_account, BlobStore};
use crate::errors::{KeychainError, Result};
use crate::vault::Snapshot;

/// A `BlobStore` backed by a mutex-guarded map.
///
/// The mutex makes the digest comparison and the write in `replace`
/// one atomic step.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Snapshot>>> {
        self.records
            .lock()
            .map_err(|_| KeychainError::StoreUnavailable("memory store lock poisoned".into()))
    }
}

impl BlobStore for MemoryStore {
    fn fetch(&self, account: &str) -> Result<Option<Snapshot>> {
        validate_account(account)?;
        Ok(self.lock()?.get(account).cloned())
    }

    fn create(&self, account: &str, snapshot: &Snapshot) -> Result<()> {
        validate_account(account)?;
        let mut records = self.lock()?;
        if records.contains_key(account) {
            return Err(KeychainError::AccountExists(account.to_string()));
        }
        records.insert(account.to_string(), snapshot.clone());
        Ok(())
    }

    fn replace(&self, account: &str, expected_digest: &str, snapshot: &Snapshot) -> Result<()> {
        validate_account(account)?;
        let mut records = self.lock()?;
        let current = records
            .get_mut(account)
            .ok_or_else(|| KeychainError::AccountNotFound(account.to_string()))?;
        if current.digest != expected_digest {
            return Err(KeychainError::Conflict(account.to_string()));
        }
        *current = snapshot.clone();
        Ok(())
    }
}
