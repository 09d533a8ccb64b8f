//! `keychain verify` — check a stored record against its digest.

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::errors::Result;

/// Execute the `verify` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    session.accounts.verify(&session.account)?;

    output::success(&format!("Stored keychain for '{}' is intact", session.account));
    Ok(())
}
