//! `keychain completions` — print a shell completion script.
//!
//! Usage:
//!   keychain completions bash > ~/.bash_completion.d/keychain
//!   keychain completions zsh

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "keychain", &mut io::stdout());
    Ok(())
}
