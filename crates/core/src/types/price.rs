//! Type-safe price representation using decimal arithmetic.
//!
//! A [`Price`] is always strictly positive and carries exactly two decimal
//! places, mirroring the `NUMERIC(10, 2)` column it is stored in.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("Enter a number.")]
    Invalid,
    /// The amount is zero or negative.
    #[error("Price must be greater than zero.")]
    NotPositive,
    /// The amount has more than two decimal places.
    #[error("Ensure that there are no more than {max} decimal places.")]
    TooPrecise {
        /// Maximum number of decimal places.
        max: u32,
    },
    /// The amount has too many digits before the decimal point.
    #[error("Ensure that there are no more than {max} digits before the decimal point.")]
    TooLarge {
        /// Maximum number of integer digits.
        max: u32,
    },
}

/// A positive amount of money in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Number of decimal places every price is stored with.
    pub const SCALE: u32 = 2;

    /// Number of digits allowed before the decimal point.
    pub const MAX_INTEGER_DIGITS: u32 = 8;

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not strictly positive, has more than
    /// two decimal places, or has more than eight integer digits.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }

        if amount.normalize().scale() > Self::SCALE {
            return Err(PriceError::TooPrecise { max: Self::SCALE });
        }

        if amount >= Decimal::from(10_i64.pow(Self::MAX_INTEGER_DIGITS)) {
            return Err(PriceError::TooLarge {
                max: Self::MAX_INTEGER_DIGITS,
            });
        }

        let mut amount = amount;
        amount.rescale(Self::SCALE);
        Ok(Self(amount))
    }

    /// Parse a price from user input such as `"19.99"`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] for non-numeric input, otherwise the
    /// same errors as [`Price::new`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid)?;
        Self::new(amount)
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(Price::new(Decimal::from(-5)), Err(PriceError::NotPositive));
        assert_eq!(Price::new(Decimal::ZERO), Err(PriceError::NotPositive));
    }

    #[test]
    fn test_rescales_to_two_places() {
        let price = Price::new(Decimal::from(1200)).unwrap();
        assert_eq!(price.to_string(), "1200.00");

        let price = Price::parse("19.9").unwrap();
        assert_eq!(price.to_string(), "19.90");
    }

    #[test]
    fn test_rejects_too_many_decimal_places() {
        assert_eq!(
            Price::parse("1.999"),
            Err(PriceError::TooPrecise { max: 2 })
        );
        // Trailing zeros are not significant.
        assert!(Price::parse("1.9900").is_ok());
    }

    #[test]
    fn test_rejects_too_large() {
        assert!(Price::parse("99999999.99").is_ok());
        assert_eq!(
            Price::parse("100000000"),
            Err(PriceError::TooLarge { max: 8 })
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Price::parse("twelve"), Err(PriceError::Invalid));
        assert_eq!(Price::parse(""), Err(PriceError::Invalid));
    }

    #[test]
    fn test_not_positive_message() {
        assert_eq!(
            PriceError::NotPositive.to_string(),
            "Price must be greater than zero."
        );
    }

    #[test]
    fn test_deserialize_accepts_numbers_and_strings() {
        let from_number: Price = serde_json::from_str("1200").unwrap();
        let from_string: Price = serde_json::from_str("\"1200\"").unwrap();
        assert_eq!(from_number, from_string);

        assert!(serde_json::from_str::<Price>("-5").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let price = Price::parse("50").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"50.00\"");
    }
}
