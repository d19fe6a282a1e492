//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{AccountRepository, ProductRepository, Repositories, TodoRepository};
use crate::services::{ImageStorage, LocalImageStorage};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like repositories, configuration and image storage.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: Option<PgPool>,
    repositories: Repositories,
    images: Arc<dyn ImageStorage>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool, if running against a database
    /// * `repositories` - Backends for products, accounts and todos
    /// * `images` - Storage strategy injected into the `/image` routes
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        pool: Option<PgPool>,
        repositories: Repositories,
        images: Arc<dyn ImageStorage>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                repositories,
                images,
            }),
        }
    }

    /// State backed by `PostgreSQL` with local-disk image storage.
    #[must_use]
    pub fn postgres(config: StorefrontConfig, pool: PgPool) -> Self {
        let repositories = Repositories::postgres(&pool);
        let images = Arc::new(LocalImageStorage::from_config(&config.media));
        Self::new(config, Some(pool), repositories, images)
    }

    /// State backed by in-memory repositories with local-disk image storage.
    #[must_use]
    pub fn in_memory(config: StorefrontConfig) -> Self {
        let images = Arc::new(LocalImageStorage::from_config(&config.media));
        Self::new(config, None, Repositories::in_memory(), images)
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the database connection pool, if one is configured.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Get the product repository.
    #[must_use]
    pub fn products(&self) -> &dyn ProductRepository {
        self.inner.repositories.products.as_ref()
    }

    /// Get the account repository.
    #[must_use]
    pub fn accounts(&self) -> &dyn AccountRepository {
        self.inner.repositories.accounts.as_ref()
    }

    /// Get the todo repository.
    #[must_use]
    pub fn todos(&self) -> &dyn TodoRepository {
        self.inner.repositories.todos.as_ref()
    }

    /// Get the injected image storage.
    #[must_use]
    pub fn images(&self) -> &dyn ImageStorage {
        self.inner.images.as_ref()
    }
}
