//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog
//! GET    /menu-items/          - List menu items (public, throttled, paged)
//! POST   /menu-items/          - Create menu item (manager/admin)
//! GET    /menu-items/{id}/     - Menu item detail (public)
//! PUT    /menu-items/{id}/     - Replace menu item (manager/admin)
//! PATCH  /menu-items/{id}/     - Update menu item fields (manager/admin)
//! DELETE /menu-items/{id}/     - Delete menu item (manager/admin)
//! GET    /categories/          - List categories (customer)
//! POST   /categories/          - Create category (admin)
//! GET    /categories/{id}/     - Category detail (customer)
//! DELETE /categories/{id}/     - Delete category (admin)
//!
//! # Role groups
//! GET    /groups/manager/users/            - List managers (manager/admin)
//! POST   /groups/manager/users/            - Add manager by username
//! DELETE /groups/manager/users/{id}/       - Remove manager by id
//! GET    /groups/delivery-crew/users/      - List delivery crew (manager)
//! POST   /groups/delivery-crew/users/      - Add crew member by username
//! DELETE /groups/delivery-crew/users/{id}/ - Remove crew member by id
//!
//! # Cart (customer)
//! GET    /cart/menu-items/     - List caller's cart
//! POST   /cart/menu-items/     - Add/replace a cart line
//! DELETE /cart/menu-items/     - Clear caller's cart
//!
//! # Orders
//! GET    /orders/              - List orders (row-set scoped by role)
//! POST   /orders/              - Checkout: cart -> order + items (customer)
//! GET    /orders/{id}/         - Order detail (customer, own orders only)
//! PUT    /orders/{id}/         - Replace assignment/status (manager)
//! PATCH  /orders/{id}/         - Update assignment/status (manager/crew)
//! DELETE /orders/{id}/         - Delete order (manager)
//! ```
//!
//! Trailing slashes are normalized away by the binary's `NormalizePath`
//! wrapper, so both spellings of every path work.

pub mod cart;
pub mod categories;
pub mod groups;
pub mod menu_items;
pub mod orders;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/menu-items",
            get(menu_items::list).post(menu_items::create),
        )
        .route(
            "/menu-items/{id}",
            get(menu_items::retrieve)
                .put(menu_items::replace)
                .patch(menu_items::patch)
                .delete(menu_items::remove),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::retrieve).delete(categories::remove),
        )
}

/// Create the group-membership routes router.
pub fn group_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/groups/manager/users",
            get(groups::list_managers).post(groups::add_manager),
        )
        .route("/groups/manager/users/{id}", delete(groups::remove_manager))
        .route(
            "/groups/delivery-crew/users",
            get(groups::list_crew).post(groups::add_crew),
        )
        .route(
            "/groups/delivery-crew/users/{id}",
            delete(groups::remove_crew),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route(
        "/cart/menu-items",
        get(cart::list).post(cart::add).delete(cart::clear),
    )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::list).post(orders::create))
        .route(
            "/orders/{id}",
            get(orders::retrieve)
                .put(orders::replace)
                .patch(orders::patch)
                .delete(orders::remove),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .merge(group_routes())
        .merge(cart_routes())
        .merge(order_routes())
}
