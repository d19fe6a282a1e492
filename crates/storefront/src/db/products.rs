//! Product repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use online_store_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::{NewProduct, Product, ProductChanges};

/// Catalog storage.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products, ordered by id.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    /// A single product, if it exists.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert a product; the store assigns id and timestamps.
    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError>;

    /// Apply a partial update. Returns `None` if the product does not exist.
    async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Delete a product. Returns `false` if it did not exist.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `PostgreSQL`-backed product repository.
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, created_at, updated_at
            FROM store.product
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, created_at, updated_at
            FROM store.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO store.product (name, price)
            VALUES ($1, $2)
            RETURNING id, name, price, created_at, updated_at
            ",
        )
        .bind(product.name())
        .bind(product.price().amount())
        .fetch_one(&self.pool)
        .await?;

        Product::try_from(row)
    }

    async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE store.product
            SET name = COALESCE($2, name),
                price = COALESCE($3, price),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, price, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(changes.name())
        .bind(changes.price().map(|p| p.amount()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM store.product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
