//! Seed the catalog with products.
//!
//! # Usage
//!
//! ```bash
//! # Eight generated products
//! store-cli seed products
//!
//! # A specific number of generated products
//! store-cli seed products --count 20
//!
//! # Products from a YAML file
//! store-cli seed products --file products.yaml
//! ```
//!
//! The YAML file is a list of `{name, price}` entries:
//!
//! ```yaml
//! - name: TV
//!   price: 1200
//! - name: Chromecast
//!   price: "49.99"
//! ```

use std::path::Path;

use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;

use online_store_core::Price;
use online_store_storefront::db::{PgProductRepository, ProductRepository};
use online_store_storefront::models::NewProduct;

use super::{CommandError, connect};

/// Number of products generated when no count is given.
pub const DEFAULT_COUNT: usize = 8;

const ADJECTIVES: [&str; 8] = [
    "Classic", "Compact", "Deluxe", "Portable", "Smart", "Vintage", "Wireless", "Premium",
];

const NOUNS: [&str; 8] = [
    "TV", "Phone", "Speaker", "Lamp", "Glasses", "Camera", "Keyboard", "Backpack",
];

/// One entry of a seed file.
#[derive(Debug, Deserialize)]
struct SeedProduct {
    name: String,
    price: Decimal,
}

/// Insert generated products, or the products listed in `file`.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid, or if the database
/// operation fails. A file is fully validated before anything is inserted.
pub async fn products(count: usize, file: Option<&Path>) -> Result<(), CommandError> {
    let products = match file {
        Some(path) => load_products(path).await?,
        None => generate_products(count, &mut rand::rng()),
    };

    let pool = connect().await?;
    let repo = PgProductRepository::new(pool);

    for product in &products {
        let created = repo.create(product).await?;
        tracing::info!(id = %created.id, name = %created.name, price = %created.price, "Seeded product");
    }

    tracing::info!("Successfully seeded {} products", products.len());
    Ok(())
}

async fn load_products(path: &Path) -> Result<Vec<NewProduct>, CommandError> {
    tracing::info!(path = %path.display(), "Loading products from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: path.display().to_string(),
            source,
        })?;

    parse_products(&content)
}

fn parse_products(content: &str) -> Result<Vec<NewProduct>, CommandError> {
    let entries: Vec<SeedProduct> = serde_yaml::from_str(content)?;

    entries
        .into_iter()
        .map(|entry| {
            Price::new(entry.price)
                .map_err(Into::into)
                .and_then(|price| NewProduct::new(&entry.name, price))
                .map_err(|source| CommandError::InvalidProduct {
                    name: entry.name.clone(),
                    source,
                })
        })
        .collect()
}

/// Random catalog entries with plausible names and prices between 1.00 and 2000.00.
fn generate_products(count: usize, rng: &mut impl Rng) -> Vec<NewProduct> {
    (0..count)
        .filter_map(|_| {
            let adjective = ADJECTIVES.get(rng.random_range(0..ADJECTIVES.len()))?;
            let noun = NOUNS.get(rng.random_range(0..NOUNS.len()))?;
            let cents: i64 = rng.random_range(100..=200_000);

            let price = Price::new(Decimal::new(cents, 2)).ok()?;
            NewProduct::new(&format!("{adjective} {noun}"), price).ok()
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_products() {
        let products = generate_products(DEFAULT_COUNT, &mut rand::rng());
        assert_eq!(products.len(), DEFAULT_COUNT);

        for product in &products {
            assert!(product.price().amount() >= Decimal::ONE);
            assert!(product.price().amount() <= Decimal::new(2000, 0));
            assert!(product.name().contains(' '));
        }
    }

    #[test]
    fn test_parse_products() {
        let products = parse_products(
            r#"
- name: TV
  price: 1200
- name: Chromecast
  price: "49.99"
"#,
        )
        .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name(), "TV");
        assert_eq!(products[1].price().to_string(), "49.99");
    }

    #[test]
    fn test_parse_products_rejects_invalid_price() {
        let err = parse_products("- name: TV\n  price: -5\n").unwrap_err();
        assert!(matches!(err, CommandError::InvalidProduct { ref name, .. } if name == "TV"));
    }
}
