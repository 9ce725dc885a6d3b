//! Customer query triage.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clothesline_core::{CustomerQuery, CustomerQueryId, Email, QueryStatus, UserId};

use super::RepositoryError;

const QUERY_COLUMNS: &str =
    "id, user_id, name, email, subject, message, status, created_at, resolved_at";

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

    /// Queries newest first, optionally narrowed to one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<QueryStatus>,
    ) -> Result<Vec<CustomerQuery>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerQueryRow>(&format!(
            "SELECT {QUERY_COLUMNS} FROM shop.customer_query
             WHERE $1::shop.query_status IS NULL OR status = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Mark a query open or resolved. Resolving stamps `resolved_at`;
    /// reopening clears it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the query does not exist.
    pub async fn set_status(
        &self,
        id: CustomerQueryId,
        status: QueryStatus,
    ) -> Result<CustomerQuery, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerQueryRow>(&format!(
            r"
            UPDATE shop.customer_query
            SET status = $2,
                resolved_at = CASE
                    WHEN $2 = 'resolved' THEN COALESCE(resolved_at, now())
                    ELSE NULL
                END
            WHERE id = $1
            RETURNING {QUERY_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }
}
