pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod index;
pub mod service;
pub mod store;
pub mod vault;

pub use errors::{ErrorKind, KeychainError, Result};
pub use vault::{Keychain, Snapshot};
