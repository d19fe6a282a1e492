//! `store-cli` subcommands.

pub mod migrate;
pub mod seed;
pub mod user;

use sqlx::PgPool;
use thiserror::Error;

use online_store_storefront::config::{ConfigError, get_database_url};
use online_store_storefront::db::{self, RepositoryError};
use online_store_storefront::models::ProductValidationError;
use online_store_storefront::services::AccountError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid product {name:?}: {source}")]
    InvalidProduct {
        name: String,
        source: ProductValidationError,
    },
}

/// Connect to the storefront database named by the environment.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url("STOREFRONT_DATABASE_URL")
        .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_string()))?;

    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&database_url).await?)
}
