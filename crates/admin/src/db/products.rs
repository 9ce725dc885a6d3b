//! Catalog writes: product create/update/delete and id allocation.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use clothesline_core::{CategoryId, Price, Product, ProductDraft, ProductId, SizeType};

use super::RepositoryError;

const PRODUCT_COLUMNS: &str = "id, name, description, price, category_id, sizes, size_type, \
                               image_url, stock_quantity, created_at, updated_at";

/// Counter row that backs `PROD-NNNN` ids.
const PRODUCT_COUNTER: &str = "product";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    category_id: Option<CategoryId>,
    sizes: Vec<String>,
    size_type: SizeType,
    image_url: Option<String>,
    stock_quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category_id: row.category_id,
            sizes: row.sizes,
            size_type: row.size_type,
            image_url: row.image_url,
            stock_quantity: row.stock_quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product administration.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products, newest first, optionally limited to one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS} FROM shop.product
            WHERE ($1::INTEGER IS NULL OR category_id = $1)
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a product under the next `PROD-NNNN` id.
    ///
    /// The counter bump and the insert commit together, so a failed insert
    /// does not burn an id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category does not exist.
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let product = Self::create_with(&mut tx, draft).await?;
        tx.commit().await?;
        Ok(product)
    }

    /// Like [`Self::create`] but on an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category does not exist.
    pub async fn create_with(
        conn: &mut PgConnection,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let id = next_product_id(conn).await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO shop.product
                (id, name, description, price, category_id, sizes, size_type, image_url, stock_quantity)
            VALUES (
                $1, $2, $3, $4, $5, $6,
                COALESCE($7, (SELECT size_type FROM shop.category WHERE id = $5), 'standard'),
                $8, $9
            )
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.category_id)
        .bind(&draft.sizes)
        .bind(draft.size_type)
        .bind(draft.image_url.as_deref())
        .bind(draft.stock_quantity)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "product"))?;

        Ok(row.into())
    }

    /// Find a product by exact name on an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_name_with(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE name = $1 ORDER BY id LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Replace a product's editable fields.
    ///
    /// A draft without `image_url` keeps the current image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE shop.product SET
                name = $2,
                description = $3,
                price = $4,
                category_id = $5,
                sizes = $6,
                size_type = COALESCE($7, size_type),
                image_url = COALESCE($8, image_url),
                stock_quantity = $9
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.category_id)
        .bind(&draft.sizes)
        .bind(draft.size_type)
        .bind(draft.image_url.as_deref())
        .bind(draft.stock_quantity)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, "product"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Point a product at a new image. Returns the product and the old URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn set_image(
        &self,
        id: &ProductId,
        image_url: &str,
    ) -> Result<(Product, Option<String>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<Option<String>> =
            sqlx::query_scalar("SELECT image_url FROM shop.product WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let previous = previous.ok_or(RepositoryError::NotFound)?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE shop.product SET image_url = $2 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(image_url)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok((row.into(), previous))
    }

    /// Delete a product. Returns it so the caller can clean up its image.
    ///
    /// Carts that still hold the product keep the line; orders keep their
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: &ProductId) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "DELETE FROM shop.product WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }
}

/// Bump the product counter and format the new id.
async fn next_product_id(conn: &mut PgConnection) -> Result<ProductId, RepositoryError> {
    let seq: i64 = sqlx::query_scalar(
        r"
        INSERT INTO shop.counter (name, seq) VALUES ($1, 1)
        ON CONFLICT (name) DO UPDATE SET seq = shop.counter.seq + 1
        RETURNING seq
        ",
    )
    .bind(PRODUCT_COUNTER)
    .fetch_one(&mut *conn)
    .await?;

    ProductId::from_sequence(seq)
        .map_err(|e| RepositoryError::DataCorruption(format!("product counter: {e}")))
}
