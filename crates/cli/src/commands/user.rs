//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! store-cli user create --username alice --password 's3cret'
//! ```
//!
//! Prints the new account's API token.

use secrecy::{ExposeSecret, SecretString};

use online_store_storefront::db::PgAccountRepository;
use online_store_storefront::services::AccountService;

use super::{CommandError, connect};

/// Create an account and print its token.
///
/// # Errors
///
/// Returns an error if the username is invalid or taken, or the database
/// operation fails.
pub async fn create(username: &str, password: &SecretString) -> Result<(), CommandError> {
    let pool = connect().await?;
    let accounts = PgAccountRepository::new(pool);

    let token = AccountService::new(&accounts)
        .signup(username, password.expose_secret())
        .await?;

    tracing::info!("Created user {username}");

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }

    Ok(())
}
