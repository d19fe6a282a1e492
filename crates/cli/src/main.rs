//! Online store CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! store-cli migrate
//!
//! # Seed the catalog (8 generated products)
//! store-cli seed products
//!
//! # Seed the catalog from a YAML file
//! store-cli seed products --file products.yaml
//!
//! # Create a user and print its API token
//! store-cli user create --username alice --password 's3cret'
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "store-cli")]
#[command(author, version, about = "Online store CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert catalog products
    Products {
        /// Number of products to generate
        #[arg(short, long, default_value_t = commands::seed::DEFAULT_COUNT)]
        count: usize,

        /// YAML file with `{name, price}` entries (overrides --count)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user and print its API token
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { count, file } => {
                commands::seed::products(count, file.as_deref()).await?;
            }
        },
        Commands::User { action } => match action {
            UserAction::Create { username, password } => {
                commands::user::create(&username, &SecretString::from(password)).await?;
            }
        },
    }
    Ok(())
}
