//! Cart route handlers.
//!
//! The cart is customer-only and scoped to the caller; prices are frozen
//! from the menu item at the moment a line is written.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;

use bistro_core::MenuItemId;

use crate::db::cart::CartRepository;
use crate::db::menu::MenuItemRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CartLine;
use crate::policy::{self, Action};
use crate::state::AppState;

/// Add-to-cart payload.
#[derive(Debug, Deserialize)]
pub struct AddToCartInput {
    #[serde(rename = "menuitem")]
    pub menu_item: MenuItemId,
    pub quantity: i64,
}

/// `GET /cart/menu-items/` - list the caller's cart.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<CartLine>>> {
    policy::authorize(Action::ViewCart, Some(&user))?;

    let lines = CartRepository::new(state.pool()).list_for(user.id).await?;
    Ok(Json(lines))
}

/// `POST /cart/menu-items/` - add a menu item to the caller's cart.
///
/// Re-adding an item replaces its line; quantity and prices are recomputed
/// from the menu item's current price.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<AddToCartInput>,
) -> Result<(StatusCode, Json<CartLine>)> {
    policy::authorize(Action::AddToCart, Some(&user))?;

    if input.quantity < 1 {
        return Err(AppError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }

    let item = MenuItemRepository::new(state.pool())
        .get(input.menu_item)
        .await?
        .ok_or_else(|| AppError::Validation("unknown menu item".to_string()))?;

    let unit_price = item.price;
    let price = unit_price * Decimal::from(input.quantity);

    let line = CartRepository::new(state.pool())
        .upsert_line(user.id, item.id, input.quantity, unit_price, price)
        .await?;

    Ok((StatusCode::CREATED, Json(line)))
}

/// `DELETE /cart/menu-items/` - clear the caller's cart.
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<StatusCode> {
    policy::authorize(Action::ClearCart, Some(&user))?;

    CartRepository::new(state.pool()).clear_for(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
