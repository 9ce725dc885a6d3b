//! Product management.

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State, multipart::MultipartRejection,
    },
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use clothesline_core::{CategoryId, Product, ProductDraft, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::services::UploadError;
use crate::state::AppState;

/// Multipart field carrying the image file.
const IMAGE_FIELD: &str = "image";

/// Product list filters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub category_id: Option<CategoryId>,
}

/// Build the products router.
///
/// `max_upload_bytes` caps the image upload body.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{id}", get(show).put(update).delete(destroy))
        .route(
            "/{id}/image",
            post(upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// GET /api/admin/products
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list(query.category_id)
        .await?;
    Ok(Json(products))
}

/// GET /api/admin/products/{id}
async fn show(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))
}

/// Create a product under the next free `PROD-NNNN` id.
///
/// POST /api/admin/products
#[instrument(skip_all, fields(admin_id = %admin.id))]
async fn create(
    State(state): State<AppState>,
    RequireWriteAccess(admin): RequireWriteAccess,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> Result<(StatusCode, Json<Product>)> {
    let draft = draft.normalized()?;
    let product = ProductRepository::new(state.pool()).create(&draft).await?;

    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/admin/products/{id}
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
async fn update(
    State(state): State<AppState>,
    RequireWriteAccess(admin): RequireWriteAccess,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> Result<Json<Product>> {
    let draft = draft.normalized()?;
    let product = ProductRepository::new(state.pool())
        .update(&id, &draft)
        .await?;

    tracing::info!("Product updated");
    Ok(Json(product))
}

/// Delete a product. Carts and past orders keep their references.
///
/// DELETE /api/admin/products/{id}
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
async fn destroy(
    State(state): State<AppState>,
    RequireWriteAccess(admin): RequireWriteAccess,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Value>> {
    let product = ProductRepository::new(state.pool()).delete(&id).await?;
    if let Some(url) = &product.image_url {
        state.images().remove(url).await;
    }

    tracing::info!("Product deleted");
    Ok(Json(json!({ "message": format!("Product {id} deleted") })))
}

/// Replace a product's image with an uploaded file.
///
/// POST /api/admin/products/{id}/image (multipart, field `image`)
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
async fn upload_image(
    State(state): State<AppState>,
    RequireWriteAccess(admin): RequireWriteAccess,
    ApiPath(id): ApiPath<ProductId>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<Product>> {
    let mut multipart = multipart
        .map_err(|rejection| AppError::InvalidRequest(rejection.status(), rejection.body_text()))?;

    let products = ProductRepository::new(state.pool());
    if products.get(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Product {id} not found")));
    }

    let mut stored = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_owned();
        let bytes = field.bytes().await?;
        stored = Some(state.images().save(&id, &content_type, &bytes).await?);
        break;
    }
    let url = stored.ok_or(UploadError::MissingImage)?;

    let (product, previous) = match products.set_image(&id, &url).await {
        Ok(updated) => updated,
        Err(e) => {
            // Product vanished between the check and the update.
            state.images().remove(&url).await;
            return Err(e.into());
        }
    };
    if let Some(previous) = previous.filter(|old| *old != url) {
        state.images().remove(&previous).await;
    }

    tracing::info!(image_url = %url, "Product image uploaded");
    Ok(Json(product))
}
