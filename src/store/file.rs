//! File-backed blob store.
//!
//! Each account is one JSON record in the store directory:
//!
//! ```text
//! <dir>/<account>.json
//! {"account":"...","keychain_json":"...","keychain_checksum":"...","updated_at":"..."}
//! ```
//!
//! Writes go to a temp file in the same directory and are renamed over
//! the record, so readers never see a half-written file.  Create and
//! replace hold `<dir>/.<account>.lock` (created exclusively) across the
//! read-compare-write sequence.  A lock file older than the stale bound
//! was left by a process that died mid-write and is taken over.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{validate_account, BlobStore};
use crate::errors::{KeychainError, Result};
use crate::vault::Snapshot;

/// How many times to retry a held lock before giving up.
const LOCK_ATTEMPTS: u32 = 50;

/// Pause between lock attempts.
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Age after which a lock file is considered abandoned.
const STALE_LOCK_AFTER: Duration = Duration::from_secs(30);

/// On-disk record for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    account: String,
    keychain_json: String,
    keychain_checksum: String,
    updated_at: DateTime<Utc>,
}

/// A `BlobStore` that keeps one JSON file per account.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    stale_lock_after: Duration,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            debug!(dir = %dir.display(), "created store directory");
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            stale_lock_after: STALE_LOCK_AFTER,
        })
    }

    /// Override how old a lock file must be before it is taken over.
    pub fn with_stale_lock_after(mut self, age: Duration) -> Self {
        self.stale_lock_after = age;
        self
    }

    /// The directory this store lives in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, account: &str) -> PathBuf {
        self.dir.join(format!("{account}.json"))
    }

    fn read_record(&self, account: &str) -> Result<Option<StoredRecord>> {
        let path = self.record_path(account);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: StoredRecord = serde_json::from_slice(&data).map_err(|e| {
            KeychainError::SerializationError(format!("{}: {e}", path.display()))
        })?;
        Ok(Some(record))
    }

    fn write_record(&self, account: &str, snapshot: &Snapshot) -> Result<()> {
        let record = StoredRecord {
            account: account.to_string(),
            keychain_json: snapshot.blob.clone(),
            keychain_checksum: snapshot.digest.clone(),
            updated_at: Utc::now(),
        };
        let bytes = serde_json::to_vec_pretty(&record)
            .map_err(|e| KeychainError::SerializationError(format!("record: {e}")))?;

        let path = self.record_path(account);
        let tmp_path = self.dir.join(format!(".{account}.json.tmp"));

        fs::write(&tmp_path, &bytes)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn lock(&self, account: &str) -> Result<LockGuard> {
        let path = self.dir.join(format!(".{account}.lock"));

        for _ in 0..LOCK_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(LockGuard { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if self.lock_is_stale(&path) {
                        warn!(lock = %path.display(), "removing stale store lock");
                        match fs::remove_file(&path) {
                            Ok(()) => continue,
                            Err(e) if e.kind() == ErrorKind::NotFound => continue,
                            Err(e) => return Err(e.into()),
                        }
                    }
                    thread::sleep(LOCK_RETRY_DELAY);
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(lock = %path.display(), "gave up waiting for store lock");
        Err(KeychainError::StoreLocked(path))
    }

    fn lock_is_stale(&self, path: &Path) -> bool {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .is_some_and(|age| age >= self.stale_lock_after)
    }
}

impl BlobStore for FileStore {
    fn fetch(&self, account: &str) -> Result<Option<Snapshot>> {
        validate_account(account)?;
        Ok(self.read_record(account)?.map(|r| Snapshot {
            blob: r.keychain_json,
            digest: r.keychain_checksum,
        }))
    }

    fn create(&self, account: &str, snapshot: &Snapshot) -> Result<()> {
        validate_account(account)?;
        let _lock = self.lock(account)?;

        if self.record_path(account).exists() {
            return Err(KeychainError::AccountExists(account.to_string()));
        }
        self.write_record(account, snapshot)?;

        debug!("created account record");
        Ok(())
    }

    fn replace(&self, account: &str, expected_digest: &str, snapshot: &Snapshot) -> Result<()> {
        validate_account(account)?;
        let _lock = self.lock(account)?;

        let current = self
            .read_record(account)?
            .ok_or_else(|| KeychainError::AccountNotFound(account.to_string()))?;
        if current.keychain_checksum != expected_digest {
            warn!("stored keychain changed since it was loaded");
            return Err(KeychainError::Conflict(account.to_string()));
        }
        self.write_record(account, snapshot)?;

        debug!("replaced account record");
        Ok(())
    }
}

/// Removes the lock file when dropped.
struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
