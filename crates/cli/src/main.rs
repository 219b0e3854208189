//! RouteClouds CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! rc-cli migrate
//!
//! # Load the starter catalog into an empty database
//! rc-cli seed
//!
//! # Grant catalog administration to an existing account
//! rc-cli user promote -u alice
//! ```
//!
//! # Environment Variables
//!
//! - `SHOP_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use routeclouds_core::UserRole;

mod commands;

#[derive(Parser)]
#[command(name = "rc-cli")]
#[command(author, version, about = "RouteClouds shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed an empty catalog with starter categories and products
    Seed,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Give an account the admin role
    Promote {
        /// Account username
        #[arg(short, long)]
        username: String,
    },
    /// Return an account to the regular user role
    Demote {
        /// Account username
        #[arg(short, long)]
        username: String,
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
        Commands::Seed => commands::seed::catalog().await?,
        Commands::User { action } => match action {
            UserAction::Promote { username } => {
                commands::user::set_role(&username, UserRole::Admin).await?;
            }
            UserAction::Demote { username } => {
                commands::user::set_role(&username, UserRole::User).await?;
            }
        },
    }
    Ok(())
}
