//! Order persistence for customers.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use clothesline_core::{
    Order, OrderId, OrderItem, OrderStatus, OrderTotals, PaymentMethod, Price, ShippingInfo,
    UserId,
};

use super::RepositoryError;

const ORDER_COLUMNS: &str = "id, user_id, items, shipping_info, payment_method, subtotal, \
                             delivery_fee, order_total, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    items: Json<Vec<OrderItem>>,
    shipping_info: Json<ShippingInfo>,
    payment_method: PaymentMethod,
    subtotal: Price,
    delivery_fee: Price,
    order_total: Price,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            items: row.items.0,
            shipping_info: row.shipping_info.0,
            payment_method: row.payment_method,
            totals: OrderTotals {
                subtotal: row.subtotal,
                delivery_fee: row.delivery_fee,
                order_total: row.order_total,
            },
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Everything needed to insert an order.
#[derive(Debug)]
pub struct NewOrder<'a> {
    pub user_id: UserId,
    pub items: &'a [OrderItem],
    pub shipping_info: &'a ShippingInfo,
    pub payment_method: PaymentMethod,
    pub totals: OrderTotals,
}

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// All orders for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert an order on an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        conn: &mut PgConnection,
        order: &NewOrder<'_>,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO shop.order
                (user_id, items, shipping_info, payment_method, subtotal, delivery_fee, order_total)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order.user_id)
        .bind(Json(order.items))
        .bind(Json(order.shipping_info))
        .bind(order.payment_method)
        .bind(order.totals.subtotal)
        .bind(order.totals.delivery_fee)
        .bind(order.totals.order_total)
        .fetch_one(conn)
        .await?;

        Ok(row.into())
    }
}
