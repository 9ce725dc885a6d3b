//! Password reset tokens.
//!
//! Tokens are single use: redeeming one marks it used and replaces the
//! user's password hash in the same transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clothesline_core::UserId;

use super::RepositoryError;

/// Repository for password reset tokens.
pub struct ResetTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ResetTokenRepository<'a> {
    /// Create a new reset token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a new token for `user_id`, invalidating any earlier unused ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            UPDATE shop.password_reset_token
            SET used_at = now()
            WHERE user_id = $1 AND used_at IS NULL
            ",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO shop.password_reset_token (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Consume a token and set the owner's new password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the token does not exist, was
    /// already used, or has expired.
    pub async fn redeem(&self, token: &str, password_hash: &str) -> Result<UserId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user_id: Option<i32> = sqlx::query_scalar(
            r"
            UPDATE shop.password_reset_token
            SET used_at = now()
            WHERE token = $1 AND used_at IS NULL AND expires_at > now()
            RETURNING user_id
            ",
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;

        let user_id = UserId::new(user_id.ok_or(RepositoryError::NotFound)?);

        let updated = sqlx::query("UPDATE shop.user SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(user_id)
    }
}
