//! `keychain login` — check the master password for an account.

use crate::cli::output;
use crate::cli::{open_session, prompt_password, Cli};
use crate::errors::Result;

/// Execute the `login` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    let password = prompt_password()?;

    let keychain = session.accounts.login(&session.account, &password)?;

    output::success(&format!(
        "Password accepted for '{}' ({} stored entries)",
        session.account,
        keychain.len()
    ));
    Ok(())
}
