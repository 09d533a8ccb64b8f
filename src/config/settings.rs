use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{KeychainError, Result};

/// Project-level configuration, loaded from `.keychain.toml`.
///
/// Every field has a sensible default so Keychain works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Directory (relative to the working directory unless absolute)
    /// where account records are stored.
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Minimum length of a new master password.
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,

    /// Account to use when `--account` is not given.
    #[serde(default)]
    pub default_account: Option<String>,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_store_dir() -> String {
    ".keychain".to_string()
}

fn default_min_password_len() -> usize {
    8
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            min_password_len: default_min_password_len(),
            default_account: None,
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    const FILE_NAME: &'static str = ".keychain.toml";

    /// Load settings from `<project_dir>/.keychain.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            KeychainError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.min_password_len == 0 {
            return Err(KeychainError::ConfigError(
                "min_password_len must be at least 1".into(),
            ));
        }

        Ok(settings)
    }

    /// Resolve the store directory against `project_dir`.
    ///
    /// Example: `project_dir/.keychain`
    pub fn store_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.store_dir)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
