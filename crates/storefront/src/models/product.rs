//! Product domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use online_store_core::{Price, PriceError, ProductId};

/// Maximum product name length.
pub const MAX_NAME_LENGTH: usize = 255;

/// Errors raised when product input fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductValidationError {
    /// The name is empty or only whitespace.
    #[error("This field may not be blank.")]
    BlankName,
    /// The name is longer than the column allows.
    #[error("Ensure this field has no more than {max} characters.")]
    NameTooLong {
        /// Maximum number of characters.
        max: usize,
    },
    /// The price is invalid.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field-level errors from a submitted product form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFormErrors {
    pub name: Option<ProductValidationError>,
    pub price: Option<PriceError>,
}

/// A validated product about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    name: String,
    price: Price,
}

impl NewProduct {
    /// Validate a product name and pair it with a price.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or too long.
    pub fn new(name: &str, price: Price) -> Result<Self, ProductValidationError> {
        Ok(Self {
            name: validate_name(name)?,
            price,
        })
    }

    /// Validate raw form input, reporting every invalid field at once.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors if the name or price is invalid.
    pub fn from_form(name: &str, price: &str) -> Result<Self, ProductFormErrors> {
        match (validate_name(name), Price::parse(price)) {
            (Ok(name), Ok(price)) => Ok(Self { name, price }),
            (name, price) => Err(ProductFormErrors {
                name: name.err(),
                price: price.err(),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }
}

/// A partial product update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    name: Option<String>,
    price: Option<Price>,
}

impl ProductChanges {
    /// Validate a partial update.
    ///
    /// # Errors
    ///
    /// Returns an error if a supplied name is blank or too long.
    pub fn new(name: Option<&str>, price: Option<Price>) -> Result<Self, ProductValidationError> {
        Ok(Self {
            name: name.map(validate_name).transpose()?,
            price,
        })
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub const fn price(&self) -> Option<Price> {
        self.price
    }

    /// Apply the changes to a product in place.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
    }
}

fn validate_name(name: &str) -> Result<String, ProductValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProductValidationError::BlankName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ProductValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(name.to_owned())
}
