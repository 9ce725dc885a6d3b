//! Cart operations.
//!
//! Each mutation locks the user's cart row, applies the line rules from
//! `clothesline_core::cart`, writes the result back and commits, so
//! concurrent requests for the same user serialize.

use sqlx::PgPool;
use tracing::instrument;

use clothesline_core::{CartError, LineKey, ProductId, QuantityUpdate, UserId};

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::{Cart, CartView};

/// Cart service.
pub struct CartService<'a> {
    pool: &'a PgPool,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's cart with product details, or `None` if it was never created.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if a query fails.
    pub async fn view(&self, user_id: UserId) -> Result<Option<CartView>> {
        match CartRepository::new(self.pool).get(user_id).await? {
            Some(cart) => Ok(Some(self.enrich(cart).await?)),
            None => Ok(None),
        }
    }

    /// Add units of a product, merging into an existing line with the same
    /// product, size and size type. Creates the cart on first use.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown product,
    /// `AppError::BadRequest` for a size the product is not sold in, and
    /// `AppError::Cart` for a rejected quantity.
    #[instrument(skip(self), fields(product_id = %key.product_id))]
    pub async fn add_item(&self, user_id: UserId, key: LineKey, quantity: u32) -> Result<CartView> {
        let product = ProductRepository::new(self.pool)
            .get(&key.product_id)
            .await?
            .ok_or_else(|| product_not_found(&key.product_id))?;
        if !product.offers_size(&key.size) {
            return Err(AppError::BadRequest(format!(
                "{} is not available in size {}",
                product.name, key.size
            )));
        }

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let mut cart = CartRepository::lock_or_create(&mut tx, user_id).await?;
        let line_quantity = cart.items.add(key, quantity)?;
        let cart = CartRepository::save(&mut tx, user_id, &cart.items).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(line_quantity, "Added item to cart");
        self.enrich(cart).await
    }

    /// Overwrite a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cart` with `CartError::LineNotFound` if the cart or
    /// line does not exist.
    #[instrument(skip(self), fields(product_id = %key.product_id))]
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        key: LineKey,
        quantity: u32,
    ) -> Result<CartView> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let mut cart = self.lock_existing(&mut tx, user_id, &key).await?;
        let outcome = cart.items.set_quantity(&key, quantity)?;
        let cart = CartRepository::save(&mut tx, user_id, &cart.items).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        match outcome {
            QuantityUpdate::Updated(q) => tracing::info!(quantity = q, "Updated cart line"),
            QuantityUpdate::Removed => tracing::info!("Removed cart line (quantity 0)"),
        }
        self.enrich(cart).await
    }

    /// Delete a line.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cart` with `CartError::LineNotFound` if the cart or
    /// line does not exist.
    #[instrument(skip(self), fields(product_id = %key.product_id))]
    pub async fn remove_item(&self, user_id: UserId, key: LineKey) -> Result<CartView> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let mut cart = self.lock_existing(&mut tx, user_id, &key).await?;
        cart.items.remove(&key)?;
        let cart = CartRepository::save(&mut tx, user_id, &cart.items).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!("Removed cart line");
        self.enrich(cart).await
    }

    /// Empty the cart, keeping the cart itself.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the user has no cart.
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(RepositoryError::from)?;
        if !CartRepository::clear(&mut conn, user_id).await? {
            return Err(AppError::NotFound("Cart not found".to_string()));
        }
        tracing::info!("Cleared cart");
        Ok(())
    }

    async fn lock_existing(
        &self,
        conn: &mut sqlx::PgConnection,
        user_id: UserId,
        key: &LineKey,
    ) -> Result<Cart> {
        CartRepository::lock(conn, user_id).await?.ok_or_else(|| {
            AppError::Cart(CartError::LineNotFound {
                product_id: key.product_id.clone(),
                size: key.size.clone(),
                size_type: key.size_type,
            })
        })
    }

    async fn enrich(&self, cart: Cart) -> Result<CartView> {
        let ids: Vec<ProductId> = cart
            .items
            .as_slice()
            .iter()
            .map(|line| line.product_id.clone())
            .collect();
        let products = ProductRepository::new(self.pool).get_many(&ids).await?;
        Ok(CartView::build(cart, &products))
    }
}

fn product_not_found(id: &ProductId) -> AppError {
    AppError::NotFound(format!("Product {id} not found"))
}
