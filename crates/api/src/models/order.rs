//! Order domain types and role-dependent response projections.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use bistro_core::{MenuItemId, OrderId, OrderItemId, OrderStatus, UserId};

/// A placed order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    /// The customer who placed the order.
    pub user: UserId,
    /// Assigned delivery crew member, if any. Only ever set to a member of
    /// the Delivery crew group (validated at the entry boundary).
    pub delivery_crew: Option<UserId>,
    pub status: OrderStatus,
    /// Sum of the order items' prices, fixed at creation.
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
}

/// An immutable order line, copied from a cart line at checkout.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order: OrderId,
    #[serde(rename = "menuitem")]
    pub menu_item: MenuItemId,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub price: Decimal,
}

/// Full order representation with embedded line items.
///
/// Served to customers and managers.
#[derive(Debug, Clone, Serialize)]
pub struct OrderFull {
    pub id: OrderId,
    pub user: UserId,
    pub delivery_crew: Option<UserId>,
    pub status: OrderStatus,
    pub total: Decimal,
    #[serde(rename = "date")]
    pub placed_at: DateTime<Utc>,
    #[serde(rename = "orderitems")]
    pub order_items: Vec<OrderItem>,
}

impl OrderFull {
    /// Combine an order with its line items.
    #[must_use]
    pub fn new(order: Order, order_items: Vec<OrderItem>) -> Self {
        Self {
            id: order.id,
            user: order.user,
            delivery_crew: order.delivery_crew,
            status: order.status,
            total: order.total,
            placed_at: order.placed_at,
            order_items,
        }
    }
}

/// Narrowed order representation for delivery crew.
///
/// Crew may only see and change delivery status, never order contents,
/// ownership, or totals.
#[derive(Debug, Clone, Serialize)]
pub struct OrderForDeliveryCrew {
    pub status: OrderStatus,
}

impl From<&Order> for OrderForDeliveryCrew {
    fn from(order: &Order) -> Self {
        Self {
            status: order.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample_order() -> Order {
        Order {
            id: OrderId::new(1),
            user: UserId::new(2),
            delivery_crew: Some(UserId::new(3)),
            status: OrderStatus::Pending,
            total: Decimal::new(2500, 2),
            placed_at: Utc::now(),
        }
    }

    #[test]
    fn test_crew_projection_exposes_only_status() {
        let view = OrderForDeliveryCrew::from(&sample_order());
        let json = serde_json::to_value(&view).expect("serialize");
        let object = json.as_object().expect("object");

        assert_eq!(object.len(), 1);
        assert_eq!(object.get("status"), Some(&serde_json::json!(0)));
    }

    #[test]
    fn test_full_projection_wire_field_names() {
        let full = OrderFull::new(sample_order(), Vec::new());
        let json = serde_json::to_value(&full).expect("serialize");
        let object = json.as_object().expect("object");

        for field in ["id", "user", "delivery_crew", "status", "total", "date", "orderitems"] {
            assert!(object.contains_key(field), "missing field {field}");
        }
    }
}
