//! Domain models for the storefront.
//!
//! These types represent validated domain objects separate from database row
//! types, plus the inputs the repositories accept.

pub mod product;
pub mod session;
pub mod todo;
pub mod user;

pub use product::{
    NewProduct, Product, ProductChanges, ProductFormErrors, ProductValidationError,
};
pub use session::keys as session_keys;
pub use todo::{NewTodo, Todo, TodoChanges, TodoValidationError};
pub use user::User;
