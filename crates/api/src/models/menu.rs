//! Catalog domain types.

use rust_decimal::Decimal;
use serde::Serialize;

use bistro_core::{CategoryId, MenuItemId};

/// A menu category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    pub title: String,
}

/// A purchasable menu item.
///
/// `price` is the current price; cart lines and order items copy it at
/// write time and are never affected by later changes here.
#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    /// Item name; unique across the catalog.
    pub title: String,
    pub price: Decimal,
    pub featured: bool,
    pub category: CategoryId,
}
