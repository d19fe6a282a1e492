//! Session middleware configuration.
//!
//! Sets up cookie sessions using tower-sessions and exposes the per-request
//! session to services through the [`SessionState`] capability.

use async_trait::async_trait;
use serde_json::Value;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "store_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Errors raised by the session backend.
#[derive(Debug, thiserror::Error)]
#[error("session error: {0}")]
pub struct SessionError(#[from] tower_sessions::session::Error);

/// Key-value state scoped to one browser session.
///
/// Services receive this explicitly rather than reaching for a request-global.
#[async_trait]
pub trait SessionState: Send + Sync {
    /// Read a value.
    async fn get_value(&self, key: &str) -> Result<Option<Value>, SessionError>;

    /// Write a value, replacing any previous one.
    async fn set_value(&self, key: &str, value: Value) -> Result<(), SessionError>;

    /// Remove a value. Absent keys are not an error.
    async fn remove_value(&self, key: &str) -> Result<(), SessionError>;
}

#[async_trait]
impl SessionState for Session {
    async fn get_value(&self, key: &str) -> Result<Option<Value>, SessionError> {
        Ok(Self::get_value(self, key).await?)
    }

    async fn set_value(&self, key: &str, value: Value) -> Result<(), SessionError> {
        self.insert_value(key, value).await?;
        Ok(())
    }

    async fn remove_value(&self, key: &str) -> Result<(), SessionError> {
        Self::remove_value(self, key).await?;
        Ok(())
    }
}

/// Create the session layer over the given store.
///
/// Production passes a `PostgresStore`; in-memory mode and tests pass a
/// `MemoryStore`.
#[must_use]
pub fn create_session_layer<Store>(
    store: Store,
    config: &StorefrontConfig,
) -> SessionManagerLayer<Store>
where
    Store: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
