//! Cart repository.
//!
//! Carts are disjoint by user ownership, so every operation here is scoped
//! to a single user id and no cross-user locking is needed.

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use bistro_core::{CartLineId, MenuItemId, UserId};

use super::{RepositoryError, parse_decimal};
use crate::models::CartLine;

/// Repository for cart-line operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

fn map_cart_line(row: &SqliteRow) -> Result<CartLine, RepositoryError> {
    let unit_price: String = row.try_get("unit_price")?;
    let price: String = row.try_get("price")?;
    Ok(CartLine {
        id: CartLineId::new(row.try_get("id")?),
        user: UserId::new(row.try_get("user_id")?),
        menu_item: MenuItemId::new(row.try_get("menu_item_id")?),
        quantity: row.try_get("quantity")?,
        unit_price: parse_decimal("unit_price", &unit_price)?,
        price: parse_decimal("price", &price)?,
    })
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List a user's cart lines, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is invalid.
    pub async fn list_for(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, menu_item_id, quantity, unit_price, price
            FROM cart_line
            WHERE user_id = ?
            ORDER BY id ASC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(map_cart_line).collect()
    }

    /// Add a menu item to a user's cart, or replace the existing line.
    ///
    /// Re-adding an item overwrites its quantity and frozen prices; there is
    /// at most one line per (user, menu item).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_line(
        &self,
        user_id: UserId,
        menu_item: MenuItemId,
        quantity: i64,
        unit_price: Decimal,
        price: Decimal,
    ) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query(
            r"
            INSERT INTO cart_line (user_id, menu_item_id, quantity, unit_price, price)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (user_id, menu_item_id)
            DO UPDATE SET quantity = excluded.quantity,
                          unit_price = excluded.unit_price,
                          price = excluded.price
            RETURNING id, user_id, menu_item_id, quantity, unit_price, price
            ",
        )
        .bind(user_id.as_i32())
        .bind(menu_item.as_i32())
        .bind(quantity)
        .bind(unit_price.to_string())
        .bind(price.to_string())
        .fetch_one(self.pool)
        .await?;

        map_cart_line(&row)
    }

    /// Delete all of a user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_for(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_line WHERE user_id = ?")
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
