//! Cart domain types.

use rust_decimal::Decimal;
use serde::Serialize;

use bistro_core::{CartLineId, MenuItemId, UserId};

/// A pending order line in a user's cart.
///
/// `unit_price` and `price` are frozen from the menu item at write time;
/// `price` is always `unit_price * quantity`. The line exists only between
/// add-to-cart and either checkout or clearing the cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub user: UserId,
    #[serde(rename = "menuitem")]
    pub menu_item: MenuItemId,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub price: Decimal,
}
