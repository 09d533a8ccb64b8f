//! Account service — keychains persisted per account in a `BlobStore`.
//!
//! Every call reconstitutes the keychain from the stored snapshot and
//! the password supplied with that call; nothing is kept between calls.
//! Mutations re-dump the keychain and write it back with a
//! compare-and-swap on the digest that was loaded.

use tracing::{debug, info};

use crate::errors::{KeychainError, Result};
use crate::index::{validate_domain, DomainIndex};
use crate::store::{validate_account, BlobStore};
use crate::vault::{Keychain, Snapshot};

/// Keychain operations scoped to accounts in a store.
pub struct Accounts<S> {
    store: S,
}

impl<S: BlobStore> Accounts<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create an account with an empty keychain.
    pub fn signup(&self, account: &str, password: &str) -> Result<()> {
        validate_account(account)?;
        if self.store.fetch(account)?.is_some() {
            return Err(KeychainError::AccountExists(account.to_string()));
        }

        let keychain = Keychain::init(password)?;
        self.store.create(account, &keychain.dump()?)?;

        info!("account created");
        Ok(())
    }

    /// Open the account's keychain.
    ///
    /// The stored checksum is the trusted digest, so a modified record
    /// fails as an integrity error before the password is even tried.
    pub fn login(&self, account: &str, password: &str) -> Result<Keychain> {
        let snapshot = self.fetch(account)?;
        Keychain::load(password, &snapshot.blob, Some(&snapshot.digest))
    }

    /// Check the stored record's digest.  Needs no password.
    pub fn verify(&self, account: &str) -> Result<()> {
        let snapshot = self.fetch(account)?;
        crate::vault::format::verify_digest(&snapshot.blob, &snapshot.digest)
    }

    /// Look up one secret.
    pub fn get_secret(&self, account: &str, password: &str, domain: &str) -> Result<Option<String>> {
        validate_domain(domain)?;
        self.login(account, password)?.get(domain)
    }

    /// Store a secret and list its domain.  Returns `true` if the domain
    /// already had a secret.
    pub fn set_secret(
        &self,
        account: &str,
        password: &str,
        domain: &str,
        secret: &str,
    ) -> Result<bool> {
        validate_domain(domain)?;
        self.update(account, password, |keychain| {
            let existed = keychain.contains(domain)?;
            keychain.set(domain, secret)?;

            let mut index = DomainIndex::read(keychain)?;
            if index.insert(domain) {
                index.write(keychain)?;
            }
            Ok(existed)
        })
    }

    /// Remove a secret and unlist its domain.  Returns `false` if there
    /// was nothing to remove.
    pub fn remove_secret(&self, account: &str, password: &str, domain: &str) -> Result<bool> {
        validate_domain(domain)?;
        self.update(account, password, |keychain| {
            let existed = keychain.remove(domain)?;

            let mut index = DomainIndex::read(keychain)?;
            if index.remove(domain) {
                index.write(keychain)?;
            }
            Ok(existed)
        })
    }

    /// All listed domain names, sorted.
    pub fn list_domains(&self, account: &str, password: &str) -> Result<Vec<String>> {
        let keychain = self.login(account, password)?;
        let index = DomainIndex::read(&keychain)?;
        Ok(index.domains().map(str::to_string).collect())
    }

    fn fetch(&self, account: &str) -> Result<Snapshot> {
        self.store
            .fetch(account)?
            .ok_or_else(|| KeychainError::AccountNotFound(account.to_string()))
    }

    /// Load, apply `f`, and write back only if the state changed.
    fn update<T>(
        &self,
        account: &str,
        password: &str,
        f: impl FnOnce(&mut Keychain) -> Result<T>,
    ) -> Result<T> {
        let loaded = self.fetch(account)?;
        let mut keychain = Keychain::load(password, &loaded.blob, Some(&loaded.digest))?;

        let out = f(&mut keychain)?;

        let updated = keychain.dump()?;
        if updated.digest != loaded.digest {
            self.store.replace(account, &loaded.digest, &updated)?;
            debug!("keychain written back");
        }
        Ok(out)
    }
}
