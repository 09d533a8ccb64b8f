use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use keychain::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Log to stderr so `get` output on stdout stays clean.
    let filter = EnvFilter::try_from_env("KEYCHAIN_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("keychain=debug")
        } else {
            EnvFilter::new("keychain=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    let result = match cli.command {
        Commands::Signup => keychain::cli::commands::signup::execute(&cli),
        Commands::Login => keychain::cli::commands::login::execute(&cli),
        Commands::Set {
            ref domain,
            ref value,
        } => keychain::cli::commands::set::execute(&cli, domain, value.as_deref()),
        Commands::Get { ref domain } => keychain::cli::commands::get::execute(&cli, domain),
        Commands::Remove { ref domain, force } => {
            keychain::cli::commands::remove::execute(&cli, domain, force)
        }
        Commands::List => keychain::cli::commands::list::execute(&cli),
        Commands::Verify => keychain::cli::commands::verify::execute(&cli),
        Commands::Completions { shell } => keychain::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        keychain::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
