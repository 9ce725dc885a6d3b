//! Order snapshots, shipping details and totals.
//!
//! An order copies product name, price and image into each item when it is
//! placed, so later catalog edits never rewrite order history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Email, OrderId, OrderStatus, PaymentMethod, Price, ProductId, SizeType, UserId};

/// Errors raised while validating a checkout submission.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The submission had no items.
    #[error("cannot place an order with no items")]
    EmptyOrder,

    /// A required shipping field was blank.
    #[error("shipping {0} is required")]
    MissingShippingField(&'static str),

    /// The shipping email did not parse.
    #[error("shipping email is invalid: {0}")]
    InvalidShippingEmail(#[from] crate::EmailError),
}

/// One purchased line, frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    /// Product name when the order was placed.
    pub name: String,
    /// Unit price when the order was placed.
    pub price: Price,
    pub image_url: Option<String>,
    pub size: String,
    pub size_type: SizeType,
    pub quantity: u32,
}

impl OrderItem {
    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Where to ship an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingInfo {
    /// Trim every field, lowercase the email and check nothing is blank.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::MissingShippingField` naming the first blank
    /// field, or `OrderError::InvalidShippingEmail`.
    pub fn normalized(self) -> Result<Self, OrderError> {
        fn required(value: String, field: &'static str) -> Result<String, OrderError> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(OrderError::MissingShippingField(field));
            }
            Ok(trimmed.to_owned())
        }

        let full_name = required(self.full_name, "full name")?;
        let email = required(self.email, "email")?;
        let email = Email::parse(&email)?.into_inner();

        Ok(Self {
            full_name,
            email,
            phone: required(self.phone, "phone")?,
            address: required(self.address, "address")?,
            city: required(self.city, "city")?,
            state: required(self.state, "state")?,
            postal_code: required(self.postal_code, "postal code")?,
            country: required(self.country, "country")?,
        })
    }
}

/// Money fields of an order as submitted by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub order_total: Price,
}

impl OrderTotals {
    /// Subtotal recomputed from the snapshotted item prices.
    #[must_use]
    pub fn snapshot_subtotal(items: &[OrderItem]) -> Price {
        items.iter().map(OrderItem::line_total).sum()
    }

    /// Whether `order_total == subtotal + delivery_fee`.
    #[must_use]
    pub fn is_self_consistent(&self) -> bool {
        self.order_total == self.subtotal + self.delivery_fee
    }

    /// Whether the submitted subtotal matches the snapshot prices.
    #[must_use]
    pub fn matches_items(&self, items: &[OrderItem]) -> bool {
        self.subtotal == Self::snapshot_subtotal(items)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_info: ShippingInfo,
    pub payment_method: PaymentMethod,
    #[serde(flatten)]
    pub totals: OrderTotals,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Total number of units across all items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(seq: i64, cents: u32, quantity: u32) -> OrderItem {
        OrderItem {
            product_id: ProductId::from_sequence(seq).unwrap(),
            name: format!("Item {seq}"),
            price: Price::from_cents(cents),
            image_url: None,
            size: "M".to_owned(),
            size_type: SizeType::Standard,
            quantity,
        }
    }

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            full_name: " Jane Doe ".to_owned(),
            email: "Jane@Example.com".to_owned(),
            phone: "555-0100".to_owned(),
            address: "1 Main St".to_owned(),
            city: "Springfield".to_owned(),
            state: "IL".to_owned(),
            postal_code: "62701".to_owned(),
            country: "US".to_owned(),
        }
    }

    #[test]
    fn test_snapshot_subtotal() {
        let items = [item(1, 1999, 2), item(2, 500, 1)];
        assert_eq!(OrderTotals::snapshot_subtotal(&items), Price::from_cents(4498));
    }

    #[test]
    fn test_submitted_totals_are_not_recomputed() {
        let items = [item(1, 1000, 1)];
        // The client claims a cheaper subtotal than the snapshot prices.
        let totals = OrderTotals {
            subtotal: Price::from_cents(100),
            delivery_fee: Price::from_cents(50),
            order_total: Price::from_cents(150),
        };
        assert!(totals.is_self_consistent());
        assert!(!totals.matches_items(&items));
        assert_eq!(totals.order_total, Price::from_cents(150));
    }

    #[test]
    fn test_inconsistent_total_detected() {
        let totals = OrderTotals {
            subtotal: Price::from_cents(1000),
            delivery_fee: Price::from_cents(100),
            order_total: Price::from_cents(999),
        };
        assert!(!totals.is_self_consistent());
    }

    #[test]
    fn test_oversize_totals_rejected_on_input() {
        let huge = "79228162514264337593543950335";
        let body = serde_json::json!({
            "subtotal": huge,
            "deliveryFee": huge,
            "orderTotal": "1.00",
        });
        assert!(serde_json::from_value::<OrderTotals>(body).is_err());
    }

    #[test]
    fn test_largest_totals_compare_without_overflow() {
        let totals = OrderTotals {
            subtotal: Price::MAX,
            delivery_fee: Price::MAX,
            order_total: Price::from_cents(100),
        };
        assert!(!totals.is_self_consistent());
        assert!(!totals.matches_items(&[item(1, 100, 1)]));
    }

    #[test]
    fn test_order_json_flattens_totals() {
        let order = Order {
            id: OrderId::new(9),
            user_id: UserId::new(3),
            items: vec![item(1, 1000, 2)],
            shipping_info: shipping(),
            payment_method: PaymentMethod::Upi,
            totals: OrderTotals {
                subtotal: Price::from_cents(2000),
                delivery_fee: Price::from_cents(0),
                order_total: Price::from_cents(2000),
            },
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["orderTotal"], "20.00");
        assert_eq!(json["paymentMethod"], "upi");
        assert_eq!(json["items"][0]["productId"], "PROD-0001");
        assert_eq!(order.item_count(), 2);
    }

    #[test]
    fn test_shipping_normalized() {
        let info = shipping().normalized().unwrap();
        assert_eq!(info.full_name, "Jane Doe");
        assert_eq!(info.email, "jane@example.com");
    }

    #[test]
    fn test_shipping_missing_field() {
        let mut info = shipping();
        info.city = "   ".to_owned();
        assert_eq!(
            info.normalized(),
            Err(OrderError::MissingShippingField("city"))
        );
    }

    #[test]
    fn test_shipping_bad_email() {
        let mut info = shipping();
        info.email = "nope".to_owned();
        assert!(matches!(
            info.normalized(),
            Err(OrderError::InvalidShippingEmail(_))
        ));
    }
}
