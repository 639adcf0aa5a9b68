//! Catalog repositories: categories and menu items.
//!
//! Menu-item listing supports the catalog's query surface: filter by
//! category, substring search on title, ordering by price, and paging.
//! Filters are assembled with `QueryBuilder` so the list and count queries
//! stay in sync.

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use bistro_core::{CategoryId, MenuItemId};

use super::{RepositoryError, fk_conflict, parse_decimal};
use crate::models::{Category, MenuItem};

/// Ordering options for menu-item listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItemOrdering {
    PriceAsc,
    PriceDesc,
}

/// Filters applied to menu-item listings.
#[derive(Debug, Clone, Default)]
pub struct MenuItemFilter {
    pub category: Option<CategoryId>,
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
    pub ordering: Option<MenuItemOrdering>,
}

fn map_category(row: &SqliteRow) -> Result<Category, RepositoryError> {
    Ok(Category {
        id: CategoryId::new(row.try_get("id")?),
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
    })
}

fn map_menu_item(row: &SqliteRow) -> Result<MenuItem, RepositoryError> {
    let price: String = row.try_get("price")?;
    Ok(MenuItem {
        id: MenuItemId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        price: parse_decimal("price", &price)?,
        featured: row.try_get("featured")?,
        category: CategoryId::new(row.try_get("category_id")?),
    })
}

/// Repository for category operations.
pub struct CategoryRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all categories, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query("SELECT id, slug, title FROM category ORDER BY id ASC")
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(map_category).collect()
    }

    /// Get a category by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query("SELECT id, slug, title FROM category WHERE id = ?")
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(map_category).transpose()
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, slug: &str, title: &str) -> Result<Category, RepositoryError> {
        let row = sqlx::query(
            "INSERT INTO category (slug, title) VALUES (?, ?) RETURNING id, slug, title",
        )
        .bind(slug)
        .bind(title)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("category slug already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        map_category(&row)
    }

    /// Delete a category by id.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if menu items still reference it.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM category WHERE id = ?")
            .bind(id.as_i32())
            .execute(self.pool)
            .await
            .map_err(|e| fk_conflict(e, "category still has menu items"))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for menu-item operations.
pub struct MenuItemRepository<'a> {
    pool: &'a SqlitePool,
}

/// Escape LIKE metacharacters so the search term matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &MenuItemFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(category) = filter.category {
        builder.push(" AND category_id = ");
        builder.push_bind(category.as_i32());
    }
    if let Some(search) = &filter.search {
        builder.push(" AND title LIKE ");
        builder.push_bind(format!("%{}%", escape_like(search)));
        builder.push(" ESCAPE '\\'");
    }
}

impl<'a> MenuItemRepository<'a> {
    /// Create a new menu-item repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List menu items matching a filter, paged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is invalid.
    pub async fn list(
        &self,
        filter: &MenuItemFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        let mut builder = QueryBuilder::new(
            "SELECT id, title, price, featured, category_id FROM menu_item",
        );
        push_filters(&mut builder, filter);
        // Prices are stored as text; cast for numeric ordering.
        match filter.ordering {
            Some(MenuItemOrdering::PriceAsc) => {
                builder.push(" ORDER BY CAST(price AS REAL) ASC, id ASC");
            }
            Some(MenuItemOrdering::PriceDesc) => {
                builder.push(" ORDER BY CAST(price AS REAL) DESC, id ASC");
            }
            None => {
                builder.push(" ORDER BY id ASC");
            }
        }
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows = builder.build().fetch_all(self.pool).await?;
        rows.iter().map(map_menu_item).collect()
    }

    /// Count menu items matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &MenuItemFilter) -> Result<i64, RepositoryError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) AS count FROM menu_item");
        push_filters(&mut builder, filter);

        let row = builder.build().fetch_one(self.pool).await?;
        Ok(row.try_get("count")?)
    }

    /// Get a menu item by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored price is invalid.
    pub async fn get(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, title, price, featured, category_id FROM menu_item WHERE id = ?",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(map_menu_item).transpose()
    }

    /// Create a menu item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the title already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        title: &str,
        price: Decimal,
        featured: bool,
        category: CategoryId,
    ) -> Result<MenuItem, RepositoryError> {
        let row = sqlx::query(
            r"
            INSERT INTO menu_item (title, price, featured, category_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, price, featured, category_id
            ",
        )
        .bind(title)
        .bind(price.to_string())
        .bind(featured)
        .bind(category.as_i32())
        .fetch_one(self.pool)
        .await
        .map_err(unique_title_conflict)?;

        map_menu_item(&row)
    }

    /// Replace all mutable fields of a menu item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new title already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: MenuItemId,
        title: &str,
        price: Decimal,
        featured: bool,
        category: CategoryId,
    ) -> Result<MenuItem, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE menu_item
            SET title = ?, price = ?, featured = ?, category_id = ?
            WHERE id = ?
            ",
        )
        .bind(title)
        .bind(price.to_string())
        .bind(featured)
        .bind(category.as_i32())
        .bind(id.as_i32())
        .execute(self.pool)
        .await
        .map_err(unique_title_conflict)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a menu item by id.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if carts or orders reference it.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: MenuItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM menu_item WHERE id = ?")
            .bind(id.as_i32())
            .execute(self.pool)
            .await
            .map_err(|e| fk_conflict(e, "menu item is referenced by existing carts or orders"))?;

        Ok(result.rows_affected() > 0)
    }
}

fn unique_title_conflict(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("menu item with this title already exists".to_owned());
    }
    RepositoryError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_metacharacters() {
        assert_eq!(escape_like("100% Rye"), "100\\% Rye");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
