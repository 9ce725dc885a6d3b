//! Order administration: listing, detail and status changes.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use clothesline_core::{
    AdminUserId, Order, OrderId, OrderItem, OrderStatus, OrderTotals, PaymentMethod, Price,
    ShippingInfo, UserId,
};

use super::RepositoryError;
use crate::models::{OrderStatusEvent, StatusChange};

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

#[derive(Debug, sqlx::FromRow)]
struct StatusEventRow {
    from_status: OrderStatus,
    to_status: OrderStatus,
    changed_by: Option<AdminUserId>,
    changed_by_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<StatusEventRow> for OrderStatusEvent {
    fn from(row: StatusEventRow) -> Self {
        Self {
            from_status: row.from_status,
            to_status: row.to_status,
            changed_by: row.changed_by,
            changed_by_name: row.changed_by_name,
            created_at: row.created_at,
        }
    }
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

    /// All orders, newest first, optionally narrowed to one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order
             WHERE $1::shop.order_status IS NULL OR status = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Orders placed by one customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
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

    /// Status changes for an order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn history(&self, id: OrderId) -> Result<Vec<OrderStatusEvent>, RepositoryError> {
        let rows = sqlx::query_as::<_, StatusEventRow>(
            r"
            SELECT e.from_status, e.to_status, e.changed_by, a.name AS changed_by_name, e.created_at
            FROM shop.order_status_event e
            LEFT JOIN admin.admin_user a ON a.id = e.changed_by
            WHERE e.order_id = $1
            ORDER BY e.created_at, e.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Move an order to `next`, recording who did it.
    ///
    /// Any status may be set from any other. Setting the current status
    /// again changes nothing and records no history. The order row is locked
    /// so the recorded `from_status` is the one actually replaced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
        changed_by: AdminUserId,
    ) -> Result<StatusChange, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: OrderStatus =
            sqlx::query_scalar("SELECT status FROM shop.order WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        if !current.is_change_to(next) {
            let order = Self::fetch_with(&mut tx, id).await?;
            tx.commit().await?;
            return Ok(StatusChange::Unchanged(order));
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE shop.order SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO shop.order_status_event (order_id, from_status, to_status, changed_by)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(id)
        .bind(current)
        .bind(next)
        .bind(changed_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(StatusChange::Changed(row.into()))
    }

    async fn fetch_with(conn: &mut PgConnection, id: OrderId) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(conn)
        .await?;

        Ok(row.into())
    }
}
