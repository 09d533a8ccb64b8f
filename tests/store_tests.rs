//! Integration tests for blob stores and the account service.

use std::cell::Cell;
use std::fs;

use keychain::errors::{ErrorKind, KeychainError};
use keychain::service::Accounts;
use keychain::store::{BlobStore, FileStore, MemoryStore};
use keychain::{Keychain, Result, Snapshot};
use tempfile::TempDir;

const PW: &str = "correct-horse";

/// Helper: a file store in a fresh temp dir.
fn file_store() -> (TempDir, FileStore) {
    let dir = TempDir::new().expect("create temp dir");
    let store = FileStore::open(dir.path()).expect("open store");
    (dir, store)
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

#[test]
fn file_store_persists_snapshot_exactly() {
    let (_dir, store) = file_store();
    let mut kc = Keychain::init(PW).unwrap();
    kc.set("example.com", "p@ss1").unwrap();
    let snap = kc.dump().unwrap();

    store.create("alice@example.com", &snap).unwrap();
    let fetched = store.fetch("alice@example.com").unwrap().unwrap();
    assert_eq!(fetched, snap);

    let kc = Keychain::load(PW, &fetched.blob, Some(&fetched.digest)).unwrap();
    assert_eq!(kc.get("example.com").unwrap().as_deref(), Some("p@ss1"));
}

#[test]
fn file_store_rejects_bad_account_names() {
    let (_dir, store) = file_store();
    let snap = Keychain::init(PW).unwrap().dump().unwrap();
    let err = store.create("../escape", &snap).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn file_store_replace_is_compare_and_swap() {
    let (_dir, store) = file_store();
    let snap1 = Keychain::init(PW).unwrap().dump().unwrap();
    store.create("alice", &snap1).unwrap();

    let snap2 = Keychain::init(PW).unwrap().dump().unwrap();
    store.replace("alice", &snap1.digest, &snap2).unwrap();

    let snap3 = Keychain::init(PW).unwrap().dump().unwrap();
    let err = store.replace("alice", &snap1.digest, &snap3).unwrap_err();
    assert!(matches!(err, KeychainError::Conflict(_)));
    assert_eq!(store.fetch("alice").unwrap(), Some(snap2));
}

// ---------------------------------------------------------------------------
// Accounts over a file store
// ---------------------------------------------------------------------------

#[test]
fn accounts_end_to_end_on_disk() {
    let (dir, store) = file_store();
    let accounts = Accounts::new(store);

    accounts.signup("alice", PW).unwrap();
    accounts.set_secret("alice", PW, "example.com", "p@ss1").unwrap();

    // A second service over the same directory sees the same data.
    let other = Accounts::new(FileStore::open(dir.path()).unwrap());
    assert_eq!(
        other.get_secret("alice", PW, "example.com").unwrap().as_deref(),
        Some("p@ss1")
    );
    assert_eq!(other.list_domains("alice", PW).unwrap(), vec!["example.com".to_string()]);

    other.remove_secret("alice", PW, "example.com").unwrap();
    assert_eq!(accounts.get_secret("alice", PW, "example.com").unwrap(), None);
    assert!(accounts.list_domains("alice", PW).unwrap().is_empty());
}

#[test]
fn record_on_disk_leaks_nothing() {
    let (dir, store) = file_store();
    let accounts = Accounts::new(store);
    accounts.signup("alice", PW).unwrap();
    accounts
        .set_secret("alice", PW, "secret-bank.example", "hunter2hunter2")
        .unwrap();

    let text = fs::read_to_string(dir.path().join("alice.json")).unwrap();
    assert!(!text.contains("secret-bank"));
    assert!(!text.contains("hunter2"));
    assert!(!text.contains(PW));
}

#[test]
fn edited_record_is_an_integrity_error_before_password_check() {
    let (dir, store) = file_store();
    let accounts = Accounts::new(store);
    accounts.signup("alice", PW).unwrap();

    // Flip one character inside the stored blob without fixing the checksum.
    let path = dir.path().join("alice.json");
    let text = fs::read_to_string(&path).unwrap();
    let edited = text.replacen("\\\"salt\\\":\\\"", "\\\"salt\\\":\\\"A", 1);
    assert_ne!(text, edited);
    fs::write(&path, edited).unwrap();

    for password in [PW, "wrong-password"] {
        let err = accounts.login("alice", password).unwrap_err();
        assert!(matches!(err, KeychainError::DigestMismatch));
    }
    assert!(accounts.verify("alice").is_err());
}

// ---------------------------------------------------------------------------
// Lost-update protection
// ---------------------------------------------------------------------------

#[test]
fn interleaved_updates_conflict_instead_of_losing_data() {
    let accounts = Accounts::new(MemoryStore::new());
    accounts.signup("alice", PW).unwrap();

    // Two clients load the same snapshot.
    let base = accounts.store().fetch("alice").unwrap().unwrap();
    let mut first = Keychain::load(PW, &base.blob, Some(&base.digest)).unwrap();
    let mut second = Keychain::load(PW, &base.blob, Some(&base.digest)).unwrap();

    first.set("one.example", "1").unwrap();
    second.set("two.example", "2").unwrap();

    accounts
        .store()
        .replace("alice", &base.digest, &first.dump().unwrap())
        .unwrap();
    let err = accounts
        .store()
        .replace("alice", &base.digest, &second.dump().unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(matches!(err, KeychainError::Conflict(_)));

    // The first write survived.
    let kc = accounts.login("alice", PW).unwrap();
    assert_eq!(kc.get("one.example").unwrap().as_deref(), Some("1"));
    assert_eq!(kc.get("two.example").unwrap(), None);
}

#[test]
fn wrong_password_never_writes() {
    let accounts = Accounts::new(MemoryStore::new());
    accounts.signup("alice", PW).unwrap();
    let before = accounts.store().fetch("alice").unwrap();

    let err = accounts
        .set_secret("alice", "wrong-password", "example.com", "x")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(accounts.store().fetch("alice").unwrap(), before);
}

// ---------------------------------------------------------------------------
// Service-level conflicts
// ---------------------------------------------------------------------------

/// A store where another client writes right after the first fetch.
struct RacingStore {
    inner: MemoryStore,
    raced: Cell<bool>,
}

impl BlobStore for RacingStore {
    fn fetch(&self, account: &str) -> Result<Option<Snapshot>> {
        let fetched = self.inner.fetch(account)?;
        if let Some(snapshot) = &fetched {
            if !self.raced.replace(true) {
                let mut other = Keychain::load(PW, &snapshot.blob, Some(&snapshot.digest))?;
                other.set("racer.example", "won")?;
                self.inner.replace(account, &snapshot.digest, &other.dump()?)?;
            }
        }
        Ok(fetched)
    }

    fn create(&self, account: &str, snapshot: &Snapshot) -> Result<()> {
        self.inner.create(account, snapshot)
    }

    fn replace(&self, account: &str, expected_digest: &str, snapshot: &Snapshot) -> Result<()> {
        self.inner.replace(account, expected_digest, snapshot)
    }
}

#[test]
fn service_update_conflicts_when_store_changes_underneath() {
    let inner = MemoryStore::new();
    let base = Keychain::init(PW).unwrap().dump().unwrap();
    inner.create("alice", &base).unwrap();

    let accounts = Accounts::new(RacingStore {
        inner,
        raced: Cell::new(false),
    });

    let err = accounts
        .set_secret("alice", PW, "example.com", "p@ss1")
        .unwrap_err();
    assert!(matches!(err, KeychainError::Conflict(_)));

    // Only the other client's write landed.
    let stored = accounts.store().inner.fetch("alice").unwrap().unwrap();
    assert_ne!(stored.digest, base.digest);
    let kc = Keychain::load(PW, &stored.blob, Some(&stored.digest)).unwrap();
    assert_eq!(kc.get("racer.example").unwrap().as_deref(), Some("won"));
    assert_eq!(kc.get("example.com").unwrap(), None);

    // A retry sees the new state and succeeds.
    accounts
        .set_secret("alice", PW, "example.com", "p@ss1")
        .unwrap();
    let kc = accounts.login("alice", PW).unwrap();
    assert_eq!(kc.get("racer.example").unwrap().as_deref(), Some("won"));
    assert_eq!(kc.get("example.com").unwrap().as_deref(), Some("p@ss1"));
}
