//! User domain types.

use chrono::{DateTime, Utc};

use online_store_core::{UserId, Username};

/// A registered account (domain type).
///
/// The password hash never leaves the repository layer inside this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
