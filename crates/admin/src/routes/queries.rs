//! Customer query triage.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use serde::Deserialize;
use tracing::instrument;

use clothesline_core::{CustomerQuery, CustomerQueryId, QueryStatus};

use crate::db::CustomerQueryRepository;
use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct QueryListQuery {
    pub status: Option<QueryStatus>,
}

#[derive(Debug, Deserialize)]
pub struct QueryStatusRequest {
    pub status: QueryStatus,
}

/// Build the queries router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}/status", put(update_status))
}

/// GET /api/admin/queries?status=
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    ApiQuery(query): ApiQuery<QueryListQuery>,
) -> Result<Json<Vec<CustomerQuery>>> {
    Ok(Json(
        CustomerQueryRepository::new(state.pool())
            .list(query.status)
            .await?,
    ))
}

/// PUT /api/admin/queries/{id}/status
#[instrument(skip_all, fields(admin_id = %admin.id, query_id = %id, status = %body.status))]
async fn update_status(
    State(state): State<AppState>,
    RequireWriteAccess(admin): RequireWriteAccess,
    ApiPath(id): ApiPath<CustomerQueryId>,
    ApiJson(body): ApiJson<QueryStatusRequest>,
) -> Result<Json<CustomerQuery>> {
    let query = CustomerQueryRepository::new(state.pool())
        .set_status(id, body.status)
        .await?;

    tracing::info!("Customer query updated");
    Ok(Json(query))
}
