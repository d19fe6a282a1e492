//! Account and API token repository.
//!
//! Usernames are unique (`account.username`) and each account owns at most one
//! token (`api_token.user_id` is unique). Both guarantees are enforced by the
//! database so concurrent requests cannot violate them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use online_store_core::{ApiToken, UserId, Username};

use super::RepositoryError;
use crate::models::User;

/// Account storage.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Create an account and its token atomically.
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken; nothing
    /// is persisted in that case.
    async fn create_user_with_token(
        &self,
        username: &Username,
        password_hash: &str,
        token: &ApiToken,
    ) -> Result<(User, ApiToken), RepositoryError>;

    /// Look up an account and its password hash by username.
    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Return the account's token, storing `candidate` if it has none yet.
    async fn get_or_create_token(
        &self,
        user_id: UserId,
        candidate: &ApiToken,
    ) -> Result<ApiToken, RepositoryError>;

    /// Resolve a presented token to its account.
    async fn user_for_token(&self, token: &ApiToken) -> Result<Option<User>, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: UserId,
    username: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for User {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            username,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: String,
}

fn parse_token(key: &str) -> Result<ApiToken, RepositoryError> {
    ApiToken::parse(key)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid token in database: {e}")))
}

/// `PostgreSQL`-backed account repository.
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn create_user_with_token(
        &self,
        username: &Username,
        password_hash: &str,
        token: &ApiToken,
    ) -> Result<(User, ApiToken), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO store.account (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, created_at
            ",
        )
        .bind(username.as_str())
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "username already exists"))?;

        let user = User::try_from(row)?;

        sqlx::query(
            r"
            INSERT INTO store.api_token (key, user_id)
            VALUES ($1, $2)
            ",
        )
        .bind(token.as_str())
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((user, token.clone()))
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r"
            SELECT id, username, created_at, password_hash
            FROM store.account
            WHERE username = $1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user = User::try_from(row.account)?;
        Ok(Some((user, row.password_hash)))
    }

    async fn get_or_create_token(
        &self,
        user_id: UserId,
        candidate: &ApiToken,
    ) -> Result<ApiToken, RepositoryError> {
        // The unique constraint on user_id makes concurrent logins converge on one row.
        sqlx::query(
            r"
            INSERT INTO store.api_token (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            ",
        )
        .bind(candidate.as_str())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let key: String = sqlx::query_scalar("SELECT key FROM store.api_token WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        parse_token(&key)
    }

    async fn user_for_token(&self, token: &ApiToken) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT a.id, a.username, a.created_at
            FROM store.api_token t
            JOIN store.account a ON a.id = t.user_id
            WHERE t.key = $1
            ",
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}
