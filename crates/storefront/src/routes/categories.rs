//! Category routes.

use axum::{Json, extract::State};

use clothesline_core::Category;

use crate::db::CategoryRepository;
use crate::error::Result;
use crate::state::AppState;

/// GET /api/categories
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(CategoryRepository::new(state.pool()).list().await?))
}
