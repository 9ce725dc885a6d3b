//! Category management.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use serde_json::{Value, json};
use tracing::instrument;

use clothesline_core::{Category, CategoryDraft, CategoryId};

use crate::db::CategoryRepository;
use crate::error::Result;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::state::AppState;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{id}", put(update).delete(destroy))
}

/// GET /api/admin/categories
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(CategoryRepository::new(state.pool()).list().await?))
}

/// POST /api/admin/categories
#[instrument(skip_all, fields(admin_id = %admin.id))]
async fn create(
    State(state): State<AppState>,
    RequireWriteAccess(admin): RequireWriteAccess,
    ApiJson(draft): ApiJson<CategoryDraft>,
) -> Result<(StatusCode, Json<Category>)> {
    let draft = draft.normalized()?;
    let category = CategoryRepository::new(state.pool()).create(&draft).await?;

    tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/admin/categories/{id}
#[instrument(skip_all, fields(admin_id = %admin.id, category_id = %id))]
async fn update(
    State(state): State<AppState>,
    RequireWriteAccess(admin): RequireWriteAccess,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(draft): ApiJson<CategoryDraft>,
) -> Result<Json<Category>> {
    let draft = draft.normalized()?;
    let category = CategoryRepository::new(state.pool())
        .update(id, &draft)
        .await?;
    Ok(Json(category))
}

/// Delete a category that no product uses.
///
/// DELETE /api/admin/categories/{id}
#[instrument(skip_all, fields(admin_id = %admin.id, category_id = %id))]
async fn destroy(
    State(state): State<AppState>,
    RequireWriteAccess(admin): RequireWriteAccess,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<Value>> {
    CategoryRepository::new(state.pool()).delete(id).await?;

    tracing::info!("Category deleted");
    Ok(Json(json!({ "message": "Category deleted" })))
}
