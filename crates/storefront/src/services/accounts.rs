//! Account service: signup, login and token authentication.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::RngCore;
use thiserror::Error;
use tracing::instrument;

use online_store_core::{ApiToken, Username, UsernameError};

use crate::db::{AccountRepository, RepositoryError};
use crate::models::User;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Password is empty.
    #[error("password may not be blank")]
    EmptyPassword,

    /// Username is already registered.
    #[error("username taken. choose another username")]
    UsernameTaken,

    /// Unknown user or wrong password.
    #[error("unable to login. check username and password")]
    InvalidCredentials,

    /// Presented token is malformed or unknown.
    #[error("invalid token")]
    InvalidToken,

    /// Password hashing failed.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Hash checked when a login names no account, so that path costs the same
/// Argon2 work as a wrong password.
static UNKNOWN_USER_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("unknown-user-placeholder").ok());

/// Account service.
///
/// Issues exactly one bearer token per account.
pub struct AccountService<'a> {
    accounts: &'a dyn AccountRepository,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(accounts: &'a dyn AccountRepository) -> Self {
        Self { accounts }
    }

    /// Register a new account and return its token.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidUsername` or `AccountError::EmptyPassword`
    /// for bad input, `AccountError::UsernameTaken` if the username exists.
    #[instrument(skip(self, password))]
    pub async fn signup(&self, username: &str, password: &str) -> Result<ApiToken, AccountError> {
        let username = Username::parse(username)?;
        if password.is_empty() {
            return Err(AccountError::EmptyPassword);
        }

        let password_hash = hash_password(password)?;

        let (user, token) = self
            .accounts
            .create_user_with_token(&username, &password_hash, &generate_token())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AccountError::UsernameTaken,
                other => AccountError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "account created");
        Ok(token)
    }

    /// Verify credentials and return the account's token, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` if the username is unknown or
    /// the password is wrong; the two cases are indistinguishable.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<ApiToken, AccountError> {
        let credentials = match Username::parse(username) {
            Ok(username) => self.accounts.find_credentials(&username).await?,
            Err(_) => None,
        };

        let Some((user, password_hash)) = credentials else {
            reject_unknown_user(password);
            return Err(AccountError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        let token = self
            .accounts
            .get_or_create_token(user.id, &generate_token())
            .await?;

        Ok(token)
    }

    /// Resolve a presented token to its account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidToken` if the token is malformed or unknown.
    pub async fn authenticate(&self, token: &str) -> Result<User, AccountError> {
        let token = ApiToken::parse(token).map_err(|_| AccountError::InvalidToken)?;

        self.accounts
            .user_for_token(&token)
            .await?
            .ok_or(AccountError::InvalidToken)
    }
}

/// Generate a fresh random token.
fn generate_token() -> ApiToken {
    let mut bytes = [0u8; ApiToken::BYTES];
    rand::rng().fill_bytes(&mut bytes);
    ApiToken::from_bytes(&bytes)
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AccountError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AccountError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AccountError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AccountError::InvalidCredentials)
}

/// Burn one verification against [`UNKNOWN_USER_HASH`]; the outcome is ignored.
fn reject_unknown_user(password: &str) {
    if let Some(hash) = UNKNOWN_USER_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::db::memory::MemoryAccountRepository;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("pw1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("pw1", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_generated_tokens_are_valid_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(ApiToken::parse(a.as_str()).is_ok());
    }

    #[tokio::test]
    async fn test_signup_then_login_returns_same_token() {
        let repo = MemoryAccountRepository::default();
        let service = AccountService::new(&repo);

        let signup = service.signup("alice", "pw1").await.unwrap();
        let first = service.login("alice", "pw1").await.unwrap();
        let second = service.login("alice", "pw1").await.unwrap();

        assert_eq!(signup, first);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_signup_duplicate_username() {
        let repo = MemoryAccountRepository::default();
        let service = AccountService::new(&repo);

        let token = service.signup("alice", "pw1").await.unwrap();
        let err = service.signup("alice", "pw2").await.unwrap_err();
        assert!(matches!(err, AccountError::UsernameTaken));

        // The original password and token still apply.
        assert_eq!(service.login("alice", "pw1").await.unwrap(), token);
    }

    #[tokio::test]
    async fn test_signup_rejects_bad_input() {
        let repo = MemoryAccountRepository::default();
        let service = AccountService::new(&repo);

        assert!(matches!(
            service.signup("", "pw").await,
            Err(AccountError::InvalidUsername(_))
        ));
        assert!(matches!(
            service.signup("bob", "").await,
            Err(AccountError::EmptyPassword)
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let repo = MemoryAccountRepository::default();
        let service = AccountService::new(&repo);
        service.signup("alice", "pw1").await.unwrap();

        let wrong_password = service.login("alice", "wrong").await.unwrap_err();
        let unknown_user = service.login("mallory", "pw1").await.unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, AccountError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let repo = MemoryAccountRepository::default();
        let service = AccountService::new(&repo);
        let token = service.signup("alice", "pw1").await.unwrap();

        let user = service.authenticate(token.as_str()).await.unwrap();
        assert_eq!(user.username.as_str(), "alice");

        assert!(matches!(
            service.authenticate("not-a-token").await,
            Err(AccountError::InvalidToken)
        ));
        assert!(matches!(
            service.authenticate(&"0".repeat(ApiToken::LENGTH)).await,
            Err(AccountError::InvalidToken)
        ));
    }

    #[test]
    fn test_unknown_user_hash_is_argon2id() {
        let hash = UNKNOWN_USER_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("anything", hash).is_err());
    }

    async fn time_failed_logins(service: &AccountService<'_>, username: &str) -> Duration {
        let start = Instant::now();
        for _ in 0..5 {
            let err = service.login(username, "wrong").await.unwrap_err();
            assert!(matches!(err, AccountError::InvalidCredentials));
        }
        start.elapsed()
    }

    #[tokio::test]
    async fn test_unknown_user_costs_a_password_check() {
        let repo = MemoryAccountRepository::default();
        let service = AccountService::new(&repo);
        service.signup("alice", "pw1").await.unwrap();

        // Warm the lazily built hash so it is not billed to either side.
        reject_unknown_user("warm-up");

        let wrong_password = time_failed_logins(&service, "alice").await;
        let unknown_user = time_failed_logins(&service, "mallory").await;
        let malformed_user = time_failed_logins(&service, "not a username!").await;

        // Without the extra verification these differ by orders of magnitude.
        assert!(unknown_user * 4 > wrong_password, "{unknown_user:?} vs {wrong_password:?}");
        assert!(malformed_user * 4 > wrong_password, "{malformed_user:?} vs {wrong_password:?}");
    }
}
