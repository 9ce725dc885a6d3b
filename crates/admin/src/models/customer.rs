//! Customer views for the back office.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clothesline_core::{Email, Order, Price, UserId};

/// A customer with order totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub order_count: i64,
    /// Sum of order totals, excluding cancelled orders.
    pub total_spent: Price,
    pub last_order_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A customer and all their orders, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    pub customer: CustomerSummary,
    pub orders: Vec<Order>,
}
