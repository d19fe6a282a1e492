//! Core types for the online store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod token;
pub mod username;

pub use id::*;
pub use price::{Price, PriceError};
pub use token::{ApiToken, TokenError};
pub use username::{Username, UsernameError};
