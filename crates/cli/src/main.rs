//! OKAMI CLI - Database migrations and back-office maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! okami migrate
//!
//! # Set or reset the admin password (read from stdin)
//! echo 'correct horse battery' | okami admin set-password
//!
//! # Check a password against the stored credential
//! echo 'correct horse battery' | okami admin check-password
//!
//! # Delete products sold out for more than 24 hours
//! okami cleanup sold-out
//! ```
//!
//! All commands read `DATABASE_URL` (and the optional API settings) from the
//! environment or a `.env` file.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "okami")]
#[command(author, version, about = "OKAMI CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage the admin credential
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Catalog maintenance
    Cleanup {
        #[command(subcommand)]
        target: CleanupTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Replace the admin password with one read from stdin
    SetPassword,
    /// Verify a password read from stdin against the stored credential
    CheckPassword,
}

#[derive(Subcommand)]
enum CleanupTarget {
    /// Delete products sold out for more than 24 hours, with their images
    SoldOut,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), commands::CliError> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::SetPassword => commands::admin::set_password().await?,
            AdminAction::CheckPassword => commands::admin::check_password().await?,
        },
        Commands::Cleanup { target } => match target {
            CleanupTarget::SoldOut => commands::cleanup::sold_out().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_nested_subcommands() {
        let cli = Cli::try_parse_from(["okami", "admin", "set-password"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Admin {
                action: AdminAction::SetPassword
            })
        ));

        let cli = Cli::try_parse_from(["okami", "cleanup", "sold-out"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cleanup {
                target: CleanupTarget::SoldOut
            })
        ));
    }
}
