//! Business logic services for storefront.
//!
//! # Services
//!
//! - `accounts` - Signup, login and bearer-token authentication
//! - `cart` - Session cart over the catalog
//! - `images` - Image upload intake with pluggable storage

pub mod accounts;
pub mod cart;
pub mod images;

pub use accounts::{AccountError, AccountService};
pub use cart::{CartError, CartService, CartView};
pub use images::{ImageError, ImageStorage, ImageStorageError, ImageUpload, LocalImageStorage};
