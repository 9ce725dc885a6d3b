//! Cart persistence.
//!
//! Reads go through [`CartRepository`]. Mutations are read-modify-write and
//! run on a transaction: lock the row with [`CartRepository::lock`] or
//! [`CartRepository::lock_or_create`], change the lines in memory, then
//! [`CartRepository::save`].

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use clothesline_core::{CartLine, CartLines, UserId};

use super::RepositoryError;
use crate::models::Cart;

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    user_id: UserId,
    items: Json<Vec<CartLine>>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            user_id: row.user_id,
            items: CartLines::from_lines(row.items.0),
            updated_at: row.updated_at,
        }
    }
}

/// Repository for carts.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's cart, if one was ever created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT user_id, items, updated_at FROM shop.cart WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Lock an existing cart row for the rest of the transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock(
        conn: &mut PgConnection,
        user_id: UserId,
    ) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT user_id, items, updated_at FROM shop.cart WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create the cart if it does not exist, then lock it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either statement fails.
    pub async fn lock_or_create(
        conn: &mut PgConnection,
        user_id: UserId,
    ) -> Result<Cart, RepositoryError> {
        sqlx::query(
            "INSERT INTO shop.cart (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        Self::lock(conn, user_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Write the lines back and bump `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart row is gone.
    pub async fn save(
        conn: &mut PgConnection,
        user_id: UserId,
        items: &CartLines,
    ) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            UPDATE shop.cart
            SET items = $2, updated_at = now()
            WHERE user_id = $1
            RETURNING user_id, items, updated_at
            ",
        )
        .bind(user_id)
        .bind(Json(items))
        .fetch_optional(conn)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Empty a cart in place. Missing carts are left missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn clear(conn: &mut PgConnection, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.cart SET items = '[]'::jsonb, updated_at = now() WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
