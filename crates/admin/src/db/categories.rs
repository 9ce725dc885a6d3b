//! Category administration.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use clothesline_core::{Category, CategoryDraft, CategoryId, SizeType};

use super::RepositoryError;

const CATEGORY_COLUMNS: &str = "id, name, slug, size_type, created_at";

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    slug: String,
    size_type: SizeType,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            size_type: row.size_type,
            created_at: row.created_at,
        }
    }
}

/// Repository for categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM shop.category ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a category from a normalized draft.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, draft: &CategoryDraft) -> Result<Category, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::create_with(&mut conn, draft).await
    }

    /// Like [`Self::create`] but on an existing connection or transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create_with(
        conn: &mut PgConnection,
        draft: &CategoryDraft,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "INSERT INTO shop.category (name, slug, size_type) VALUES ($1, $2, $3)
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(&draft.name)
        .bind(draft.slug())
        .bind(draft.size_type)
        .fetch_one(conn)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "category slug"))?;

        Ok(row.into())
    }

    /// Insert a category, or rename and retype the one with the same slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert_with(
        conn: &mut PgConnection,
        draft: &CategoryDraft,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r"
            INSERT INTO shop.category (name, slug, size_type) VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name, size_type = EXCLUDED.size_type
            RETURNING {CATEGORY_COLUMNS}
            "
        ))
        .bind(&draft.name)
        .bind(draft.slug())
        .bind(draft.size_type)
        .fetch_one(conn)
        .await?;

        Ok(row.into())
    }

    /// Find a category by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug_with(
        conn: &mut PgConnection,
        slug: &str,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM shop.category WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Rename a category or change its slug or default size type.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist and
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE shop.category SET name = $2, slug = $3, size_type = $4 WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(draft.slug())
        .bind(draft.size_type)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "category slug"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete an empty category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` while products still use it and
    /// `RepositoryError::NotFound` if it does not exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let in_use: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shop.product WHERE category_id = $1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if in_use > 0 {
            return Err(RepositoryError::Conflict(format!(
                "category still has {in_use} product(s)"
            )));
        }

        let deleted = sqlx::query("DELETE FROM shop.category WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_constraint(e, "category"))?
            .rows_affected();
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}
