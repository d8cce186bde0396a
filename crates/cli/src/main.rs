//! Akwaba CLI - Database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! akwaba-cli migrate
//!
//! # Create an admin account (password from AKWABA_ADMIN_PASSWORD)
//! akwaba-cli admin create -e admin@example.com -n "Admin Name"
//!
//! # Change the role of an existing account
//! akwaba-cli admin set-role -e someone@example.com -r admin
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create admin accounts
//! - `admin set-role` - Promote or demote an account

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "akwaba-cli")]
#[command(author, version, about = "Akwaba storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Contact phone number
        #[arg(short, long, default_value = "")]
        phone: String,
    },
    /// Change the role of an existing account
    SetRole {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// New role (`customer` or `admin`)
        #[arg(short, long)]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { email, name, phone } => {
                commands::admin::create(&email, &name, &phone).await?;
            }
            AdminAction::SetRole { email, role } => {
                commands::admin::set_role(&email, &role).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_admin_create_with_default_phone() {
        let cli = Cli::try_parse_from([
            "akwaba-cli",
            "admin",
            "create",
            "-e",
            "admin@akwaba.ci",
            "-n",
            "Awa",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Admin {
                action: AdminAction::Create { phone, .. }
            }) if phone.is_empty()
        ));
    }

    #[test]
    fn parses_set_role() {
        let cli = Cli::try_parse_from([
            "akwaba-cli",
            "admin",
            "set-role",
            "-e",
            "a@b.ci",
            "-r",
            "admin",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Admin {
                action: AdminAction::SetRole { role, .. }
            }) if role == "admin"
        ));
    }
}
