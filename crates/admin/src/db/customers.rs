//! Read-only customer views with order aggregates.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clothesline_core::{Email, Price, UserId};

use super::RepositoryError;
use crate::models::CustomerSummary;

const SUMMARY_QUERY: &str = r"
    SELECT u.id, u.name, u.email, u.created_at,
           COUNT(o.id) AS order_count,
           COALESCE(SUM(o.order_total) FILTER (WHERE o.status <> 'cancelled'), 0) AS total_spent,
           MAX(o.created_at) AS last_order_at
    FROM shop.user u
    LEFT JOIN shop.order o ON o.user_id = u.id
";

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: UserId,
    name: String,
    email: Email,
    created_at: DateTime<Utc>,
    order_count: i64,
    total_spent: Price,
    last_order_at: Option<DateTime<Utc>>,
}

impl From<CustomerRow> for CustomerSummary {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            order_count: row.order_count,
            total_spent: row.total_spent,
            last_order_at: row.last_order_at,
            created_at: row.created_at,
        }
    }
}

/// Repository for customer accounts.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All customers, newest account first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<CustomerSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "{SUMMARY_QUERY} GROUP BY u.id ORDER BY u.created_at DESC, u.id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// One customer with order aggregates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<CustomerSummary>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "{SUMMARY_QUERY} WHERE u.id = $1 GROUP BY u.id"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
