//! `keychain list` — display stored domain names in a table.

use crate::cli::output;
use crate::cli::{open_session, prompt_password, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    let password = prompt_password()?;

    let domains = session.accounts.list_domains(&session.account, &password)?;

    output::info(&format!(
        "{} — {} domain(s)",
        session.account,
        domains.len()
    ));
    output::print_domains_table(&domains);

    Ok(())
}
