//! Cart records and the enriched view returned to clients.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clothesline_core::{CartLine, CartLines, Price, Product, ProductId, SizeType, UserId};

/// A user's stored cart.
#[derive(Debug, Clone)]
pub struct Cart {
    pub user_id: UserId,
    pub items: CartLines,
    pub updated_at: DateTime<Utc>,
}

/// Cart as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub user_id: UserId,
    pub items: Vec<CartItemView>,
    /// Sum of quantities across all lines.
    pub item_count: u64,
    /// Sum of current `price * quantity` for lines whose product still exists.
    pub subtotal: Price,
    pub updated_at: DateTime<Utc>,
}

/// One cart line with the product's current details.
///
/// `product` is `None` when the line points at a product that no longer
/// exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub product_id: ProductId,
    pub size: String,
    pub size_type: SizeType,
    pub quantity: u32,
    pub product: Option<Product>,
}

impl CartView {
    /// Join cart lines with the products they reference.
    ///
    /// `products` may be in any order and may be missing entries.
    #[must_use]
    pub fn build(cart: Cart, products: &[Product]) -> Self {
        let item_count = cart.items.total_quantity();
        let items: Vec<CartItemView> = cart
            .items
            .into_inner()
            .into_iter()
            .map(|line: CartLine| {
                let product = products.iter().find(|p| p.id == line.product_id).cloned();
                CartItemView {
                    product_id: line.product_id,
                    size: line.size,
                    size_type: line.size_type,
                    quantity: line.quantity,
                    product,
                }
            })
            .collect();
        let subtotal = items
            .iter()
            .filter_map(|i| i.product.as_ref().map(|p| p.price.times(i.quantity)))
            .sum();

        Self {
            user_id: cart.user_id,
            items,
            item_count,
            subtotal,
            updated_at: cart.updated_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clothesline_core::LineKey;

    use super::*;

    fn product(seq: i64, cents: u32) -> Product {
        Product {
            id: ProductId::from_sequence(seq).unwrap(),
            name: format!("Product {seq}"),
            description: String::new(),
            price: Price::from_cents(cents),
            category_id: None,
            sizes: vec!["M".to_owned()],
            size_type: SizeType::Standard,
            image_url: None,
            stock_quantity: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_reports_dangling_products() {
        let mut lines = CartLines::new();
        let live = ProductId::from_sequence(1).unwrap();
        let gone = ProductId::from_sequence(2).unwrap();
        lines
            .add(LineKey::new(live, "M", SizeType::Standard).unwrap(), 2)
            .unwrap();
        lines
            .add(LineKey::new(gone, "32", SizeType::Waist).unwrap(), 1)
            .unwrap();

        let cart = Cart {
            user_id: UserId::new(5),
            items: lines,
            updated_at: Utc::now(),
        };
        let view = CartView::build(cart, &[product(1, 1250)]);

        assert_eq!(view.items.len(), 2);
        assert!(view.items[0].product.is_some());
        assert!(view.items[1].product.is_none());
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, Price::from_cents(2500));
    }
}
