//! Order repository, including checkout (order assembly).

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use bistro_core::{MenuItemId, OrderId, OrderItemId, OrderStatus, UserId};

use super::{RepositoryError, parse_decimal};
use crate::models::{Order, OrderItem};
use crate::policy::OrderScope;

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

fn map_order(row: &SqliteRow) -> Result<Order, RepositoryError> {
    let total: String = row.try_get("total")?;
    let status: i64 = row.try_get("status")?;
    Ok(Order {
        id: OrderId::new(row.try_get("id")?),
        user: UserId::new(row.try_get("user_id")?),
        delivery_crew: row
            .try_get::<Option<i32>, _>("delivery_crew_id")?
            .map(UserId::new),
        status: OrderStatus::from(status),
        total: parse_decimal("total", &total)?,
        placed_at: row.try_get("placed_at")?,
    })
}

fn map_order_item(row: &SqliteRow) -> Result<OrderItem, RepositoryError> {
    let unit_price: String = row.try_get("unit_price")?;
    let price: String = row.try_get("price")?;
    Ok(OrderItem {
        id: OrderItemId::new(row.try_get("id")?),
        order: OrderId::new(row.try_get("order_id")?),
        menu_item: MenuItemId::new(row.try_get("menu_item_id")?),
        quantity: row.try_get("quantity")?,
        unit_price: parse_decimal("unit_price", &unit_price)?,
        price: parse_decimal("price", &price)?,
    })
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Convert a user's cart into a persisted order with line items.
    ///
    /// Runs in a single transaction: the cart snapshot, the order, its
    /// items, the recomputed total, and the cart deletion either all commit
    /// or none do. A cart mutation racing with checkout can therefore not
    /// leave a half-built order or a stale total behind.
    ///
    /// An empty cart yields an empty order with total 0; callers that want
    /// to reject empty checkouts must do so before calling this.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails (the
    /// transaction is rolled back).
    /// Returns `RepositoryError::DataCorruption` if a stored price is invalid.
    pub async fn create_from_cart(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart_rows = sqlx::query(
            r"
            SELECT menu_item_id, quantity, unit_price, price
            FROM cart_line
            WHERE user_id = ?
            ORDER BY id ASC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(&mut *tx)
        .await?;

        let order_row = sqlx::query(
            r"
            INSERT INTO customer_order (user_id, delivery_crew_id, status, total, placed_at)
            VALUES (?, NULL, 0, '0', ?)
            RETURNING id
            ",
        )
        .bind(user_id.as_i32())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;
        let order_id: i32 = order_row.try_get("id")?;

        for line in &cart_rows {
            let menu_item_id: i32 = line.try_get("menu_item_id")?;
            let quantity: i64 = line.try_get("quantity")?;
            let unit_price: String = line.try_get("unit_price")?;
            let price: String = line.try_get("price")?;

            sqlx::query(
                r"
                INSERT INTO order_item (order_id, menu_item_id, quantity, unit_price, price)
                VALUES (?, ?, ?, ?, ?)
                ",
            )
            .bind(order_id)
            .bind(menu_item_id)
            .bind(quantity)
            .bind(unit_price)
            .bind(price)
            .execute(&mut *tx)
            .await?;
        }

        // Total is the sum of the items as persisted, read back inside the
        // same transaction.
        let item_rows = sqlx::query(
            r"
            SELECT id, order_id, menu_item_id, quantity, unit_price, price
            FROM order_item
            WHERE order_id = ?
            ORDER BY id ASC
            ",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        let items = item_rows
            .iter()
            .map(map_order_item)
            .collect::<Result<Vec<_>, _>>()?;
        let total: Decimal = items.iter().map(|item| item.price).sum();

        sqlx::query("UPDATE customer_order SET total = ? WHERE id = ?")
            .bind(total.to_string())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM cart_line WHERE user_id = ?")
            .bind(user_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, order_id, items = items.len(), "order placed");
        Ok(items)
    }

    /// List orders visible within a scope, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored total is invalid.
    pub async fn list(&self, scope: OrderScope) -> Result<Vec<Order>, RepositoryError> {
        const COLUMNS: &str = "id, user_id, delivery_crew_id, status, total, placed_at";

        let rows = match scope {
            OrderScope::All => {
                sqlx::query(&format!(
                    "SELECT {COLUMNS} FROM customer_order ORDER BY id ASC"
                ))
                .fetch_all(self.pool)
                .await?
            }
            OrderScope::AssignedTo(crew_id) => {
                sqlx::query(&format!(
                    "SELECT {COLUMNS} FROM customer_order WHERE delivery_crew_id = ? ORDER BY id ASC"
                ))
                .bind(crew_id.as_i32())
                .fetch_all(self.pool)
                .await?
            }
            OrderScope::OwnedBy(user_id) => {
                sqlx::query(&format!(
                    "SELECT {COLUMNS} FROM customer_order WHERE user_id = ? ORDER BY id ASC"
                ))
                .bind(user_id.as_i32())
                .fetch_all(self.pool)
                .await?
            }
        };

        rows.iter().map(map_order).collect()
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored total is invalid.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, delivery_crew_id, status, total, placed_at
            FROM customer_order
            WHERE id = ?
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(map_order).transpose()
    }

    /// List the line items of an order, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is invalid.
    pub async fn items_for(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT id, order_id, menu_item_id, quantity, unit_price, price
            FROM order_item
            WHERE order_id = ?
            ORDER BY id ASC
            ",
        )
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(map_order_item).collect()
    }

    /// Set an order's delivery crew assignment and status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: OrderId,
        delivery_crew: Option<UserId>,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let result = sqlx::query(
            "UPDATE customer_order SET delivery_crew_id = ?, status = ? WHERE id = ?",
        )
        .bind(delivery_crew.map(|crew| crew.as_i32()))
        .bind(status.as_i64())
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete an order by id (its items cascade).
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM customer_order WHERE id = ?")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
