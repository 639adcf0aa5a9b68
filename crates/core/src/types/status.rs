//! Order delivery status.

use serde::{Deserialize, Serialize};

/// Delivery status of an order.
///
/// Stored as an integer: 0 is pending, any nonzero value is delivered.
/// The status is binary; there are no intermediate states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "i64", into = "i64")]
pub enum OrderStatus {
    #[default]
    Pending,
    Delivered,
}

impl OrderStatus {
    /// Integer form as persisted and serialized.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Pending => 0,
            Self::Delivered => 1,
        }
    }
}

impl From<i64> for OrderStatus {
    fn from(value: i64) -> Self {
        if value == 0 { Self::Pending } else { Self::Delivered }
    }
}

impl From<OrderStatus> for i64 {
    fn from(status: OrderStatus) -> Self {
        status.as_i64()
    }
}
