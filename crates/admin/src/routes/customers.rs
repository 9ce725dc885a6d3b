//! Customer listing and detail.

use axum::{Json, Router, extract::State, routing::get};

use clothesline_core::UserId;

use crate::db::{CustomerRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiPath;
use crate::middleware::RequireAdminAuth;
use crate::models::{CustomerDetail, CustomerSummary};
use crate::state::AppState;

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}", get(show))
}

/// GET /api/admin/customers
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
) -> Result<Json<Vec<CustomerSummary>>> {
    Ok(Json(CustomerRepository::new(state.pool()).list().await?))
}

/// GET /api/admin/customers/{id}
async fn show(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<CustomerDetail>> {
    let customer = CustomerRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Customer {id} not found")))?;
    let orders = OrderRepository::new(state.pool()).list_for_user(id).await?;

    Ok(Json(CustomerDetail { customer, orders }))
}
