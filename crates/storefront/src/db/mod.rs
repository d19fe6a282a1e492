//! Database operations for the storefront.
//!
//! # Schema: `store`
//!
//! ## Tables
//!
//! - `product` - Catalog products
//! - `account` - Registered users (username + Argon2 hash)
//! - `api_token` - One bearer token per account
//! - `todo` - Owner-scoped todo items
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! Every store is reached through a repository trait so the HTTP layer can run
//! against `PostgreSQL` in production and the in-memory backends in [`memory`]
//! for tests and demos.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p online-store-cli -- migrate
//! ```

pub mod accounts;
pub mod memory;
pub mod products;
pub mod todos;

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use accounts::{AccountRepository, PgAccountRepository};
pub use products::{PgProductRepository, ProductRepository};
pub use todos::{PgTodoRepository, TodoRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_insert(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(err)
    }
}

/// The set of repositories the application runs against.
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub todos: Arc<dyn TodoRepository>,
}

impl Repositories {
    /// Repositories backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            products: Arc::new(PgProductRepository::new(pool.clone())),
            accounts: Arc::new(PgAccountRepository::new(pool.clone())),
            todos: Arc::new(PgTodoRepository::new(pool.clone())),
        }
    }

    /// Empty in-memory repositories.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            products: Arc::new(memory::MemoryProductRepository::default()),
            accounts: Arc::new(memory::MemoryAccountRepository::default()),
            todos: Arc::new(memory::MemoryTodoRepository::default()),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
