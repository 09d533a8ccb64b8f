//! `keychain set` — store a password for a domain.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_session, prompt_password, Cli};
use crate::errors::{KeychainError, Result};

/// Execute the `set` command.
pub fn execute(cli: &Cli, domain: &str, value: Option<&str>) -> Result<()> {
    let session = open_session(cli)?;

    // Determine the password to store from one of three sources.
    let secret = if let Some(v) = value {
        // Source 1: Inline value on the command line.
        output::warning("Value provided on command line — it may appear in shell history.");
        Zeroizing::new(v.to_string())
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string())
    } else {
        // Source 3: Interactive secure prompt (default).
        let v = dialoguer::Password::new()
            .with_prompt(format!("Password for {domain}"))
            .interact()
            .map_err(|e| KeychainError::CommandFailed(format!("input prompt: {e}")))?;
        Zeroizing::new(v)
    };

    let password = prompt_password()?;
    let existed = session
        .accounts
        .set_secret(&session.account, &password, domain, &secret)?;

    if existed {
        output::success(&format!("Password for '{domain}' updated"));
    } else {
        output::success(&format!("Password for '{domain}' added"));
    }

    Ok(())
}
