//! Cart routes.
//!
//! Every handler returns the full cart after the change so the client can
//! re-render from server state.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use clothesline_core::{LineKey, ProductId, SizeType, UserId, cart::parse_quantity};

use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::CartView;
use crate::services::CartService;
use crate::state::AppState;

/// Add-to-cart body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub size: String,
    #[serde(default)]
    pub size_type: SizeType,
    pub quantity: i64,
}

/// Quantity update body. `quantity: 0` removes the line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub quantity: i64,
    pub size: String,
    #[serde(default)]
    pub size_type: SizeType,
}

/// Line removal body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    pub size: String,
    #[serde(default)]
    pub size_type: SizeType,
}

/// GET /api/cart/{userId}
#[instrument(skip_all, fields(%user_id))]
pub async fn show(
    State(state): State<AppState>,
    auth: RequireAuth,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<CartView>> {
    auth.ensure_owner(user_id)?;
    CartService::new(state.pool())
        .view(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))
}

/// POST /api/cart/{userId}/items
#[instrument(skip_all, fields(%user_id))]
pub async fn add_item(
    State(state): State<AppState>,
    auth: RequireAuth,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(body): ApiJson<AddItemRequest>,
) -> Result<Json<CartView>> {
    auth.ensure_owner(user_id)?;
    let quantity = parse_quantity(body.quantity, 1)?;
    let key = LineKey::new(body.product_id, &body.size, body.size_type)?;

    let cart = CartService::new(state.pool())
        .add_item(user_id, key, quantity)
        .await?;
    Ok(Json(cart))
}

/// PUT /api/cart/{userId}/items/{productId}
#[instrument(skip_all, fields(%user_id, %product_id))]
pub async fn update_item(
    State(state): State<AppState>,
    auth: RequireAuth,
    ApiPath((user_id, product_id)): ApiPath<(UserId, ProductId)>,
    ApiJson(body): ApiJson<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    auth.ensure_owner(user_id)?;
    let quantity = parse_quantity(body.quantity, 0)?;
    let key = LineKey::new(product_id, &body.size, body.size_type)?;

    let cart = CartService::new(state.pool())
        .update_quantity(user_id, key, quantity)
        .await?;
    Ok(Json(cart))
}

/// DELETE /api/cart/{userId}/items/{productId}
#[instrument(skip_all, fields(%user_id, %product_id))]
pub async fn remove_item(
    State(state): State<AppState>,
    auth: RequireAuth,
    ApiPath((user_id, product_id)): ApiPath<(UserId, ProductId)>,
    ApiJson(body): ApiJson<RemoveItemRequest>,
) -> Result<Json<CartView>> {
    auth.ensure_owner(user_id)?;
    let key = LineKey::new(product_id, &body.size, body.size_type)?;

    let cart = CartService::new(state.pool())
        .remove_item(user_id, key)
        .await?;
    Ok(Json(cart))
}

/// DELETE /api/cart/{userId}
#[instrument(skip_all, fields(%user_id))]
pub async fn clear(
    State(state): State<AppState>,
    auth: RequireAuth,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<Value>> {
    auth.ensure_owner(user_id)?;
    CartService::new(state.pool()).clear(user_id).await?;
    Ok(Json(json!({ "message": "Cart cleared" })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_item_body_defaults_size_type() {
        let body: AddItemRequest = serde_json::from_value(json!({
            "productId": "PROD-0042",
            "size": "32",
            "quantity": 1
        }))
        .unwrap();
        assert_eq!(body.size_type, SizeType::Standard);
        assert_eq!(body.product_id.sequence(), 42);
    }

    #[test]
    fn test_add_item_body_rejects_bad_product_id() {
        let result = serde_json::from_value::<AddItemRequest>(json!({
            "productId": "42",
            "size": "M",
            "quantity": 1
        }));
        assert!(result.is_err());
    }
}
