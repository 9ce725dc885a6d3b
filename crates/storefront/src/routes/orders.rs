//! Order routes.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use clothesline_core::{Order, OrderId, UserId};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::services::{CheckoutService, PlaceOrder};
use crate::state::AppState;

/// Response for a newly placed order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: OrderId,
    pub order: Order,
}

/// Place an order from the submitted items and clear the cart.
///
/// POST /api/orders
#[instrument(skip_all, fields(user_id = %body.user_id))]
pub async fn create(
    State(state): State<AppState>,
    auth: RequireAuth,
    ApiJson(body): ApiJson<PlaceOrder>,
) -> Result<(StatusCode, Json<CreateOrderResponse>)> {
    auth.ensure_owner(body.user_id)?;
    let order = CheckoutService::new(state.pool()).place_order(body).await?;

    if let Some(email) = state.email().cloned() {
        let order = order.clone();
        tokio::spawn(async move {
            if let Err(e) = email.send_order_confirmation(&order).await {
                tracing::error!(order_id = %order.id, "Failed to send order confirmation: {e}");
            }
        });
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order_id: order.id,
            order,
        }),
    ))
}

/// GET /api/orders/{id}
#[instrument(skip_all, fields(order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    auth: RequireAuth,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {id} not found")))?;
    auth.ensure_owner(order.user_id)?;
    Ok(Json(order))
}

/// Orders for a user, newest first.
///
/// GET /api/orders/user/{userId}
#[instrument(skip_all, fields(%user_id))]
pub async fn list_for_user(
    State(state): State<AppState>,
    auth: RequireAuth,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<Vec<Order>>> {
    auth.ensure_owner(user_id)?;
    Ok(Json(
        OrderRepository::new(state.pool())
            .list_for_user(user_id)
            .await?,
    ))
}
