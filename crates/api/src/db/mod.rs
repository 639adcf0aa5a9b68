//! Database operations for the Bistro service database.
//!
//! # Tables
//!
//! - `user` / `user_group` / `auth_token` - identities, role groups, tokens
//! - `category` / `menu_item` - catalog
//! - `cart_line` - per-user uncommitted order lines
//! - `customer_order` / `order_item` - placed orders and their frozen lines
//!
//! Repositories use sqlx's runtime query API; money columns are stored as
//! canonical decimal text and parsed at the row boundary.
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and are embedded via
//! `sqlx::migrate!`; the binary runs them on startup.

pub mod cart;
pub mod menu;
pub mod orders;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate menu item title).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// Foreign keys are enforced on every connection; the database file is
/// created if missing.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Map a foreign-key violation to a `Conflict` with a caller-facing message.
///
/// Deletes on referenced rows (a menu item in a cart or order, a category
/// with items) are client errors, not server faults.
pub(crate) fn fk_conflict(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Parse a stored decimal text column.
///
/// A malformed stored value means the row was written outside the service
/// and is treated as corruption, not as a client error.
pub(crate) fn parse_decimal(column: &str, value: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(value).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid decimal in column {column}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_valid() {
        let value = parse_decimal("price", "12.50").expect("valid decimal");
        assert_eq!(value.to_string(), "12.50");
    }

    #[test]
    fn test_parse_decimal_invalid_is_corruption() {
        let err = parse_decimal("price", "twelve").expect_err("invalid decimal");
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
