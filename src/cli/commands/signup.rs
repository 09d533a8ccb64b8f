//! `keychain signup` — create an account with an empty keychain.

use tracing::info;

use crate::cli::output;
use crate::cli::{open_session, prompt_new_password, Cli};
use crate::errors::{KeychainError, Result};
use crate::store::BlobStore;

/// Execute the `signup` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;

    // Fail before prompting if the account is already taken.
    if session.accounts.store().fetch(&session.account)?.is_some() {
        output::tip("Use `keychain login` to check your password.");
        return Err(KeychainError::AccountExists(session.account));
    }

    let password = prompt_new_password(session.settings.min_password_len)?;
    session.accounts.signup(&session.account, &password)?;
    info!(store = %session.accounts.store().dir().display(), "signup complete");

    output::success(&format!("Keychain created for '{}'", session.account));
    output::tip("Run `keychain set <DOMAIN>` to store a password.");

    Ok(())
}
