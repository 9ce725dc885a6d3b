//! Contact form submissions.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clothesline_core::query::ValidQuery;
use clothesline_core::{CustomerQuery, CustomerQueryId, Email, QueryStatus, UserId};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct CustomerQueryRow {
    id: CustomerQueryId,
    user_id: Option<UserId>,
    name: String,
    email: Email,
    subject: String,
    message: String,
    status: QueryStatus,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl From<CustomerQueryRow> for CustomerQuery {
    fn from(row: CustomerQueryRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            status: row.status,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
        }
    }
}

/// Repository for customer queries.
pub struct CustomerQueryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerQueryRepository<'a> {
    /// Create a new customer query repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a validated submission.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: Option<UserId>,
        query: &ValidQuery,
    ) -> Result<CustomerQuery, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerQueryRow>(
            r"
            INSERT INTO shop.customer_query (user_id, name, email, subject, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, email, subject, message, status, created_at, resolved_at
            ",
        )
        .bind(user_id)
        .bind(&query.name)
        .bind(&query.email)
        .bind(&query.subject)
        .bind(&query.message)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}
