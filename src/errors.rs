use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in Keychain.
#[derive(Debug, Error)]
pub enum KeychainError {
    // --- Validation errors ---
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Secret is {0} bytes — the maximum is {1} bytes")]
    SecretTooLong(usize, usize),

    #[error("Invalid keychain format: {0}")]
    InvalidFormat(String),

    // --- Authentication errors ---
    #[error("Master password check failed — wrong password")]
    WrongPassword,

    // --- Integrity errors ---
    #[error("Digest mismatch — stored keychain may be tampered")]
    DigestMismatch,

    #[error("Entry failed authentication — keychain may be tampered or corrupted")]
    EntryTampered,

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Storage errors ---
    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    #[error("Account '{0}' already exists")]
    AccountExists(String),

    #[error("Keychain for '{0}' changed since it was loaded — retry the operation")]
    Conflict(String),

    #[error("Store is locked by another process: {0} (if no keychain process is running, delete it)")]
    StoreLocked(PathBuf),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Coarse classification of a [`KeychainError`].
///
/// Collaborating layers may present several kinds with one message, but
/// a wrong password and a tampered blob always land in different kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Integrity,
    Crypto,
    Storage,
    Config,
    Command,
}

impl KeychainError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::SecretTooLong(..) | Self::InvalidFormat(_) => {
                ErrorKind::Validation
            }
            Self::WrongPassword => ErrorKind::Authentication,
            Self::DigestMismatch | Self::EntryTampered => ErrorKind::Integrity,
            Self::EncryptionFailed(_) | Self::KeyDerivationFailed(_) => ErrorKind::Crypto,
            Self::AccountNotFound(_)
            | Self::AccountExists(_)
            | Self::Conflict(_)
            | Self::StoreLocked(_)
            | Self::StoreUnavailable(_)
            | Self::Io(_)
            | Self::SerializationError(_) => ErrorKind::Storage,
            Self::ConfigError(_) => ErrorKind::Config,
            Self::CommandFailed(_) => ErrorKind::Command,
        }
    }
}

/// Convenience type alias for Keychain results.
pub type Result<T> = std::result::Result<T, KeychainError>;
