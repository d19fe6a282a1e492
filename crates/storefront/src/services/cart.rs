//! Session cart.
//!
//! The cart is a JSON object under [`session_keys::CART_PRODUCT_DATA`] mapping
//! each product id (as a string key) to itself. Membership is resolved against
//! the catalog on every view, so products deleted from the catalog drop out of
//! the cart without any cleanup.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::instrument;

use online_store_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::middleware::session::{SessionError, SessionState};
use crate::models::{Product, session_keys};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// What the cart page shows.
#[derive(Debug, Clone, Default)]
pub struct CartView {
    /// The whole catalog.
    pub all_products: Vec<Product>,
    /// The catalog products currently in the cart.
    pub cart_products: Vec<Product>,
}

/// Cart operations over one session.
pub struct CartService<'a> {
    session: &'a dyn SessionState,
    products: &'a dyn ProductRepository,
}

impl<'a> CartService<'a> {
    /// Create a cart service for the given session and catalog.
    #[must_use]
    pub const fn new(session: &'a dyn SessionState, products: &'a dyn ProductRepository) -> Self {
        Self { session, products }
    }

    /// Current catalog and the subset of it that is in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or catalog cannot be read.
    #[instrument(skip(self))]
    pub async fn view(&self) -> Result<CartView, CartError> {
        let ids = self.cart_ids().await?;
        let all_products = self.products.list().await?;
        let cart_products = all_products
            .iter()
            .filter(|product| ids.contains(&product.id))
            .cloned()
            .collect();

        Ok(CartView {
            all_products,
            cart_products,
        })
    }

    /// Put a product in the cart. Adding it again changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    #[instrument(skip(self))]
    pub async fn add(&self, product_id: ProductId) -> Result<(), CartError> {
        let mut entries = self.entries().await?;
        entries.insert(product_id.to_string(), Value::from(product_id.as_i32()));
        self.save(entries).await
    }

    /// Take a product out of the cart. No-op if it is not there.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: ProductId) -> Result<(), CartError> {
        let mut entries = self.entries().await?;
        if entries.remove(&product_id.to_string()).is_some() {
            self.save(entries).await?;
        }
        Ok(())
    }

    /// Empty the cart. No-op if it is already empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CartError> {
        self.session
            .remove_value(session_keys::CART_PRODUCT_DATA)
            .await?;
        Ok(())
    }

    /// Stored cart entries; malformed data reads as an empty cart.
    async fn entries(&self) -> Result<Map<String, Value>, CartError> {
        let value = self
            .session
            .get_value(session_keys::CART_PRODUCT_DATA)
            .await?;

        Ok(match value {
            Some(Value::Object(entries)) => entries,
            Some(other) => {
                tracing::warn!(?other, "discarding malformed cart data");
                Map::new()
            }
            None => Map::new(),
        })
    }

    async fn cart_ids(&self) -> Result<BTreeSet<ProductId>, CartError> {
        Ok(self
            .entries()
            .await?
            .keys()
            .filter_map(|key| key.parse().ok())
            .collect())
    }

    async fn save(&self, entries: Map<String, Value>) -> Result<(), CartError> {
        self.session
            .set_value(session_keys::CART_PRODUCT_DATA, Value::Object(entries))
            .await?;
        Ok(())
    }
}
