//! Domain index — the list of stored domain names.
//!
//! The keychain itself cannot enumerate its entries (keys are MACs), so
//! the list is kept as ordinary entries under a reserved sentinel name.
//! The newline-separated list is split into chunks that each fit in one
//! padded secret:
//!
//! ```text
//! "\0keychain-index/0" -> "bank.example\nexample.com\nmail.example"
//! "\0keychain-index/1" -> "..."
//! ```

use std::collections::BTreeSet;

use crate::errors::{KeychainError, Result};
use crate::vault::{Keychain, MAX_SECRET_LEN};

/// Prefix of every index chunk name.  Starts with NUL so no valid
/// domain can collide with it.
pub const INDEX_SENTINEL: &str = "\u{0}keychain-index/";

/// Longest domain name accepted, in bytes.
const MAX_DOMAIN_LEN: usize = 255;

/// In-memory copy of the index.
#[derive(Debug, Default, Clone)]
pub struct DomainIndex {
    domains: BTreeSet<String>,
    /// Chunks present in the keychain when this index was read.
    chunks: usize,
}

impl DomainIndex {
    /// Read the index from `keychain`.  A keychain without one yields
    /// an empty index.
    pub fn read(keychain: &Keychain) -> Result<Self> {
        let mut text = String::new();
        let mut chunks = 0;
        while let Some(part) = keychain.get(&chunk_name(chunks))? {
            text.push_str(&part);
            chunks += 1;
        }

        let domains = text
            .split('\n')
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self { domains, chunks })
    }

    /// Write the index back, dropping chunks it no longer needs.
    pub fn write(&mut self, keychain: &mut Keychain) -> Result<()> {
        let text = self
            .domains
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        let parts = split_chunks(&text, MAX_SECRET_LEN);

        for (i, part) in parts.iter().enumerate() {
            keychain.set(&chunk_name(i), part)?;
        }
        for stale in parts.len()..self.chunks {
            keychain.remove(&chunk_name(stale))?;
        }

        self.chunks = parts.len();
        Ok(())
    }

    /// Add a domain.  Returns `false` if it was already listed.
    pub fn insert(&mut self, domain: &str) -> bool {
        self.domains.insert(domain.to_string())
    }

    /// Remove a domain.  Returns `false` if it was not listed.
    pub fn remove(&mut self, domain: &str) -> bool {
        self.domains.remove(domain)
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    /// Domain names in sorted order.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// Validate a domain name for use with the index.
///
/// Newlines would corrupt the index and NUL is reserved for sentinels.
pub fn validate_domain(domain: &str) -> Result<()> {
    if domain.is_empty() {
        return Err(KeychainError::InvalidArgument(
            "domain cannot be empty".into(),
        ));
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(KeychainError::InvalidArgument(format!(
            "domain cannot exceed {MAX_DOMAIN_LEN} bytes"
        )));
    }
    if domain.contains(['\n', '\r', '\0']) {
        return Err(KeychainError::InvalidArgument(
            "domain cannot contain newlines or NUL characters".into(),
        ));
    }
    Ok(())
}

fn chunk_name(n: usize) -> String {
    format!("{INDEX_SENTINEL}{n}")
}

/// Split `text` into pieces of at most `max` bytes on char boundaries.
fn split_chunks(text: &str, max: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = rest.len().min(max);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        let (head, tail) = rest.split_at(end);
        parts.push(head);
        rest = tail;
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_respects_limit_and_boundaries() {
        assert!(split_chunks("", 4).is_empty());
        assert_eq!(split_chunks("abcdefg", 3), vec!["abc", "def", "g"]);
        // "é" is two bytes; never split inside it.
        assert_eq!(split_chunks("aéé", 2), vec!["a", "é", "é"]);
    }

    #[test]
    fn validate_domain_rules() {
        assert!(validate_domain("example.com").is_ok());
        assert!(validate_domain("my bank (personal)").is_ok());
        assert!(validate_domain("").is_err());
        assert!(validate_domain("a\nb").is_err());
        assert!(validate_domain("\0keychain-index/0").is_err());
        assert!(validate_domain(&"d".repeat(256)).is_err());
    }

    #[test]
    fn index_roundtrip_through_keychain() {
        let mut kc = Keychain::init("index-test-pw").unwrap();
        let mut index = DomainIndex::read(&kc).unwrap();
        assert!(index.is_empty());

        for i in 0..20 {
            index.insert(&format!("site-{i:02}.example.com"));
        }
        index.write(&mut kc).unwrap();
        // 20 names * ~22 bytes cannot fit in one 64-byte chunk.
        assert!(kc.len() > 1);

        let reread = DomainIndex::read(&kc).unwrap();
        assert_eq!(reread.len(), 20);
        assert_eq!(reread.domains().next(), Some("site-00.example.com"));
    }

    #[test]
    fn shrinking_index_removes_stale_chunks() {
        let mut kc = Keychain::init("index-test-pw").unwrap();
        let mut index = DomainIndex::read(&kc).unwrap();
        for i in 0..10 {
            index.insert(&format!("long-domain-name-{i}.example.org"));
        }
        index.write(&mut kc).unwrap();
        let grown = kc.len();

        let mut index = DomainIndex::read(&kc).unwrap();
        for i in 1..10 {
            index.remove(&format!("long-domain-name-{i}.example.org"));
        }
        index.write(&mut kc).unwrap();

        assert!(kc.len() < grown);
        assert_eq!(kc.len(), 1);
        let reread = DomainIndex::read(&kc).unwrap();
        assert!(reread.contains("long-domain-name-0.example.org"));
        assert_eq!(reread.len(), 1);
    }

    #[test]
    fn index_is_invisible_to_domain_lookups() {
        let mut kc = Keychain::init("index-test-pw").unwrap();
        let mut index = DomainIndex::default();
        index.insert("example.com");
        index.write(&mut kc).unwrap();

        assert_eq!(kc.get("example.com").unwrap(), None);
    }
}
