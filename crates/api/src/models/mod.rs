//! Domain types and response projections.
//!
//! These types represent validated domain objects separate from database
//! row types. Response shapes that narrow fields by role are defined as
//! explicit projection structs, not runtime field removal.

pub mod cart;
pub mod menu;
pub mod order;
pub mod user;

pub use cart::CartLine;
pub use menu::{Category, MenuItem};
pub use order::{Order, OrderForDeliveryCrew, OrderFull, OrderItem};
pub use user::{CurrentUser, MemberView, User};
