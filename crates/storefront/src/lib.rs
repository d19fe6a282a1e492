//! Online store storefront library.
//!
//! Product catalog pages, a session cart, image upload and a token
//! authenticated JSON API for accounts, products and todos. Exposed as a
//! library so the binary, the CLI and the integration tests share one router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
