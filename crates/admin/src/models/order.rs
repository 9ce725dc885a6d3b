//! Order status history.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clothesline_core::{AdminUserId, Order, OrderStatus};

/// One recorded status change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusEvent {
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    pub changed_by: Option<AdminUserId>,
    /// Name of the admin who made the change, if they still exist.
    pub changed_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An order with its status history, oldest change first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order: Order,
    pub history: Vec<OrderStatusEvent>,
}

/// Result of applying a status change.
#[derive(Debug, Clone)]
pub enum StatusChange {
    /// The status moved and an event was recorded.
    Changed(Order),
    /// The order already had the requested status.
    Unchanged(Order),
}

impl StatusChange {
    /// The order after the change.
    #[must_use]
    pub fn into_order(self) -> Order {
        match self {
            Self::Changed(order) | Self::Unchanged(order) => order,
        }
    }
}
