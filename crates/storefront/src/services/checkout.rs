//! Order placement.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use clothesline_core::{
    CartError, CartLine, CartLines, Order, OrderError, OrderItem, OrderTotals, PaymentMethod,
    ProductId, ShippingInfo, UserId,
};

use crate::db::orders::NewOrder;
use crate::db::{CartRepository, OrderRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};

/// Checkout submission.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub user_id: UserId,
    pub items: Vec<CartLine>,
    pub shipping_info: ShippingInfo,
    pub payment_method: PaymentMethod,
    #[serde(flatten)]
    pub totals: OrderTotals,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for `request.user_id` and empty their cart.
    ///
    /// Item names, prices and images are copied from the catalog as of now.
    /// Order insert and cart clear commit together.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Order` for an empty order or bad shipping details,
    /// `AppError::Cart` for a zero quantity or blank size, and
    /// `AppError::NotFound` if any product does not exist.
    #[instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn place_order(&self, request: PlaceOrder) -> Result<Order> {
        let PlaceOrder {
            user_id,
            items,
            shipping_info,
            payment_method,
            totals,
        } = request;

        if items.is_empty() {
            return Err(OrderError::EmptyOrder.into());
        }
        let lines = validate_lines(items)?;
        let shipping_info = shipping_info.normalized()?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let ids: Vec<ProductId> = lines
            .as_slice()
            .iter()
            .map(|line| line.product_id.clone())
            .collect();
        let products = ProductRepository::get_many_with(&mut tx, &ids).await?;

        let snapshot = lines
            .as_slice()
            .iter()
            .map(|line| {
                products
                    .iter()
                    .find(|p| p.id == line.product_id)
                    .map(|p| p.snapshot(&line.size, line.size_type, line.quantity))
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Product {} not found", line.product_id))
                    })
            })
            .collect::<Result<Vec<OrderItem>>>()?;

        if !totals.is_self_consistent() || !totals.matches_items(&snapshot) {
            tracing::warn!(
                submitted_subtotal = %totals.subtotal,
                computed_subtotal = %OrderTotals::snapshot_subtotal(&snapshot),
                delivery_fee = %totals.delivery_fee,
                order_total = %totals.order_total,
                "Submitted order totals do not match item prices; storing as submitted"
            );
        }

        let order = OrderRepository::insert(
            &mut tx,
            &NewOrder {
                user_id,
                items: &snapshot,
                shipping_info: &shipping_info,
                payment_method,
                totals,
            },
        )
        .await?;
        CartRepository::clear(&mut tx, user_id).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(order_id = %order.id, "Order placed");
        Ok(order)
    }
}

/// Check quantities and sizes, then merge duplicate lines.
fn validate_lines(items: Vec<CartLine>) -> std::result::Result<CartLines, CartError> {
    let mut lines = Vec::with_capacity(items.len());
    for line in items {
        if line.quantity == 0 {
            return Err(CartError::InvalidQuantity { min: 1, got: 0 });
        }
        let size = line.size.trim();
        if size.is_empty() {
            return Err(CartError::MissingSize);
        }
        lines.push(CartLine {
            size: size.to_owned(),
            ..line
        });
    }
    Ok(CartLines::from_lines(lines))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clothesline_core::SizeType;

    fn line(seq: i64, size: &str, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::from_sequence(seq).unwrap(),
            size: size.to_owned(),
            size_type: SizeType::Standard,
            quantity,
        }
    }

    #[test]
    fn test_duplicate_lines_merged() {
        let lines = validate_lines(vec![line(1, "M", 1), line(1, " M ", 2), line(2, "L", 1)]).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.as_slice()[0].quantity, 3);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert_eq!(
            validate_lines(vec![line(1, "M", 0)]),
            Err(CartError::InvalidQuantity { min: 1, got: 0 })
        );
    }

    #[test]
    fn test_blank_size_rejected() {
        assert_eq!(
            validate_lines(vec![line(1, "  ", 1)]),
            Err(CartError::MissingSize)
        );
    }

    #[test]
    fn test_place_order_body() {
        let body = serde_json::json!({
            "userId": 4,
            "items": [{"productId": "PROD-0001", "size": "M", "sizeType": "standard", "quantity": 2}],
            "shippingInfo": {
                "fullName": "Jane Doe", "email": "jane@example.com", "phone": "555",
                "address": "1 Main St", "city": "Springfield", "state": "IL",
                "postalCode": "62701", "country": "US"
            },
            "paymentMethod": "card",
            "subtotal": "40.00",
            "deliveryFee": "5.00",
            "orderTotal": "45.00"
        });
        let request: PlaceOrder = serde_json::from_value(body).unwrap();
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.user_id, UserId::new(4));
        assert_eq!(request.payment_method, PaymentMethod::Card);
        assert!(request.totals.is_self_consistent());
    }

    #[test]
    fn test_malformed_product_id_rejected() {
        let body = serde_json::json!({
            "userId": 4,
            "items": [{"productId": "SKU-1", "size": "M", "sizeType": "standard", "quantity": 1}],
            "shippingInfo": {
                "fullName": "a", "email": "a@b.co", "phone": "1", "address": "x",
                "city": "c", "state": "s", "postalCode": "p", "country": "US"
            },
            "paymentMethod": "upi",
            "subtotal": "1.00", "deliveryFee": "0.00", "orderTotal": "1.00"
        });
        assert!(serde_json::from_value::<PlaceOrder>(body).is_err());
    }
}
