//! `keychain get` — print the password stored for a domain.

use crate::cli::output;
use crate::cli::{open_session, prompt_password, Cli};
use crate::errors::{KeychainError, Result};

/// Execute the `get` command.
pub fn execute(cli: &Cli, domain: &str) -> Result<()> {
    let session = open_session(cli)?;
    let password = prompt_password()?;

    match session
        .accounts
        .get_secret(&session.account, &password, domain)?
    {
        Some(secret) => {
            println!("{secret}");
            Ok(())
        }
        None => {
            output::tip("Run `keychain list` to see stored domains.");
            Err(KeychainError::CommandFailed(format!(
                "no password stored for '{domain}'"
            )))
        }
    }
}
