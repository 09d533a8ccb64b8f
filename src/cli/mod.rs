//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{KeychainError, Result};
use crate::service::Accounts;
use crate::store::{validate_account, FileStore};

/// Environment variable consulted before prompting for the master password.
pub const PASSWORD_ENV: &str = "KEYCHAIN_PASSWORD";

/// Keychain CLI: per-domain password storage.
#[derive(Parser)]
#[command(
    name = "keychain",
    about = "Password-protected, tamper-evident password keychain",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Account whose keychain to use
    #[arg(short, long, env = "KEYCHAIN_ACCOUNT", global = true)]
    pub account: Option<String>,

    /// Store directory (default: .keychain, or `store_dir` from .keychain.toml)
    #[arg(long, global = true)]
    pub store_dir: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create an account with an empty keychain
    Signup,

    /// Check the master password for an account
    Login,

    /// Store a password for a domain (add or replace)
    Set {
        /// Domain name (e.g. example.com)
        domain: String,
        /// Password (omit for interactive prompt)
        value: Option<String>,
    },

    /// Print the password stored for a domain
    Get {
        /// Domain name
        domain: String,
    },

    /// Remove the password stored for a domain
    Remove {
        /// Domain name
        domain: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List stored domain names
    List,

    /// Verify the stored keychain's digest (no password needed)
    Verify,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Everything a command needs to reach an account's keychain.
pub struct Session {
    pub accounts: Accounts<FileStore>,
    pub account: String,
    pub settings: Settings,
}

/// Resolve settings, the store directory and the account from the CLI
/// arguments and `.keychain.toml`.
pub fn open_session(cli: &Cli) -> Result<Session> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;

    let account = cli
        .account
        .clone()
        .or_else(|| settings.default_account.clone())
        .ok_or_else(|| {
            KeychainError::CommandFailed(
                "no account given — pass --account or set KEYCHAIN_ACCOUNT".into(),
            )
        })?;
    validate_account(&account)?;

    let store = FileStore::open(&store_path(cli, &settings)?)?;

    Ok(Session {
        accounts: Accounts::new(store),
        account,
        settings,
    })
}

/// Build the store directory path from `--store-dir` or the settings.
pub fn store_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match &cli.store_dir {
        Some(dir) => cwd.join(dir),
        None => settings.store_path(&cwd),
    })
}

/// Get the master password, trying in order:
/// 1. `KEYCHAIN_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| KeychainError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used by `signup`).
///
/// Also respects `KEYCHAIN_PASSWORD`.  Enforces `min_len` characters.
pub fn prompt_new_password(min_len: usize) -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        check_password_len(&pw, min_len)?;
        return Ok(pw);
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| KeychainError::CommandFailed(format!("password prompt: {e}")))?;
        let password = Zeroizing::new(password);

        if let Err(e) = check_password_len(&password, min_len) {
            output::warning(&format!("{e}. Try again."));
            continue;
        }

        return Ok(password);
    }
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// Reject passwords shorter than `min_len` characters.
pub fn check_password_len(password: &str, min_len: usize) -> Result<()> {
    if password.chars().count() < min_len {
        return Err(KeychainError::InvalidArgument(format!(
            "password must be at least {min_len} characters"
        )));
    }
    Ok(())
}
