//! Order listing, detail and status changes.

use axum::{Json, Router, extract::State, routing::get, routing::put};
use serde::Deserialize;
use tracing::instrument;

use clothesline_core::{Order, OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::models::{OrderDetail, StatusChange};
use crate::state::AppState;

/// Order list filters.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

/// Status change body.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

/// Build the order browsing router, mounted at `/api/admin/orders`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}", get(show))
}

/// Build the status router, mounted at `/api/orders`.
pub fn status_router() -> Router<AppState> {
    Router::new().route("/{id}/status", put(update_status))
}

/// GET /api/admin/orders?status=
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    ApiQuery(query): ApiQuery<OrderListQuery>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(
        OrderRepository::new(state.pool()).list(query.status).await?,
    ))
}

/// GET /api/admin/orders/{id}
async fn show(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderDetail>> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {id} not found")))?;
    let history = orders.history(id).await?;

    Ok(Json(OrderDetail { order, history }))
}

/// Set an order's status. Any status may replace any other.
///
/// PUT /api/orders/{id}/status
#[instrument(skip_all, fields(admin_id = %admin.id, order_id = %id, status = %body.status))]
async fn update_status(
    State(state): State<AppState>,
    RequireWriteAccess(admin): RequireWriteAccess,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(body): ApiJson<StatusUpdateRequest>,
) -> Result<Json<Order>> {
    let change = OrderRepository::new(state.pool())
        .update_status(id, body.status, admin.id)
        .await?;

    if let StatusChange::Changed(order) = &change {
        tracing::info!(user_id = %order.user_id, "Order status changed");
    }
    Ok(Json(change.into_order()))
}
