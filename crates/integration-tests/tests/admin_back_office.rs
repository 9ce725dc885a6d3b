//! Integration tests for the admin back office.
//!
//! These tests require running admin and storefront servers and a database.
//! Run with: `cargo test -p clothesline-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use clothesline_core::{AdminRole, Price, ProductId};
use clothesline_integration_tests::{
    Admin, Customer, TEST_PASSWORD, admin_url, client, create_product, pool, shipping_info,
    storefront_url, unique_email,
};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Place a one-item order as a fresh customer and return its id.
async fn place_order() -> i64 {
    let pool = pool().await;
    let product = create_product(&pool, 1200).await;
    let customer = Customer::register().await;
    let body = json!({
        "userId": customer.id,
        "items": [{ "productId": product.id, "size": "S", "sizeType": "standard", "quantity": 1 }],
        "shippingInfo": shipping_info(),
        "paymentMethod": "card",
        "subtotal": Price::from_cents(1200),
        "deliveryFee": Price::ZERO,
        "orderTotal": Price::from_cents(1200),
    });
    let placed: Value = customer
        .client
        .post(format!("{}/api/orders", storefront_url()))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    placed["orderId"].as_i64().unwrap()
}

async fn set_status(admin: &Admin, order_id: i64, status: &str) -> reqwest::Response {
    admin
        .client
        .put(format!("{}/api/orders/{order_id}/status", admin_url()))
        .json(&json!({ "status": status }))
        .send()
        .await
        .unwrap()
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_login_and_me() {
    let pool = pool().await;
    let admin = Admin::login_as(&pool, AdminRole::Admin).await;

    let me: Value = admin
        .client
        .get(format!("{}/api/admin/auth/me", admin_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["email"], admin.email.as_str());
    assert_eq!(me["role"], "admin");
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_login_wrong_password() {
    let resp = client()
        .post(format!("{}/api/admin/auth/login", admin_url()))
        .json(&json!({ "email": unique_email("nobody"), "password": TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_routes_require_login() {
    let resp = client()
        .get(format!("{}/api/admin/orders", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_viewer_can_read_but_not_write() {
    let pool = pool().await;
    let viewer = Admin::login_as(&pool, AdminRole::Viewer).await;

    let resp = viewer
        .client
        .get(format!("{}/api/admin/products", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = viewer
        .client
        .post(format!("{}/api/admin/categories", admin_url()))
        .json(&json!({ "name": "Hats" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_create_product_assigns_prod_id() {
    let pool = pool().await;
    let admin = Admin::login_as(&pool, AdminRole::Admin).await;

    let resp = admin
        .client
        .post(format!("{}/api/admin/products", admin_url()))
        .json(&json!({
            "name": "Linen Shirt",
            "price": "39.50",
            "sizes": ["S", "M"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let product: Value = resp.json().await.unwrap();
    let id = product["id"].as_str().unwrap();
    assert!(id.parse::<ProductId>().is_ok(), "{id}");
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_category_in_use_cannot_be_deleted() {
    let pool = pool().await;
    let admin = Admin::login_as(&pool, AdminRole::Admin).await;
    let name = format!("Jackets {}", uuid::Uuid::new_v4().simple());

    let category: Value = admin
        .client
        .post(format!("{}/api/admin/categories", admin_url()))
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let category_id = category["id"].as_i64().unwrap();

    let resp = admin
        .client
        .post(format!("{}/api/admin/products", admin_url()))
        .json(&json!({ "name": "Rain Jacket", "price": "80.00", "categoryId": category_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = admin
        .client
        .delete(format!("{}/api/admin/categories/{category_id}", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_image_upload() {
    let pool = pool().await;
    let admin = Admin::login_as(&pool, AdminRole::Admin).await;
    let product = create_product(&pool, 1000).await;
    let url = format!("{}/api/admin/products/{}/image", admin_url(), product.id);

    let svg = Part::bytes(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_vec())
        .file_name("logo.svg")
        .mime_str("image/svg+xml")
        .unwrap();
    let resp = admin
        .client
        .post(&url)
        .multipart(Form::new().part("image", svg))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let png = Part::bytes(PNG_HEADER.to_vec())
        .file_name("shirt.png")
        .mime_str("image/png")
        .unwrap();
    let resp = admin
        .client
        .post(&url)
        .multipart(Form::new().part("image", png))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let updated: Value = resp.json().await.unwrap();
    let image_url = updated["imageUrl"].as_str().unwrap();
    assert!(image_url.starts_with(&format!("/uploads/products/{}-", product.id)));
    assert!(image_url.ends_with(".png"));
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
#[ignore = "Requires running admin and storefront servers and database"]
async fn test_any_status_change_is_recorded() {
    let pool = pool().await;
    let admin = Admin::login_as(&pool, AdminRole::Admin).await;
    let order_id = place_order().await;

    for status in ["shipped", "delivered", "pending", "cancelled", "processing"] {
        let resp = set_status(&admin, order_id, status).await;
        assert_eq!(resp.status(), StatusCode::OK, "-> {status}");
        let order: Value = resp.json().await.unwrap();
        assert_eq!(order["status"], status);
    }

    // Same status is accepted without a new history entry
    let resp = set_status(&admin, order_id, "processing").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let detail: Value = admin
        .client
        .get(format!("{}/api/admin/orders/{order_id}", admin_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["order"]["status"], "processing");
    let history = detail["history"].as_array().unwrap();
    assert_eq!(history.len(), 5);
    assert_eq!(history[0]["fromStatus"], "pending");
    assert_eq!(history[0]["toStatus"], "shipped");
    assert_eq!(history[2]["fromStatus"], "delivered");
    assert_eq!(history[2]["toStatus"], "pending");
    assert_eq!(history[4]["fromStatus"], "cancelled");
    assert_eq!(history[4]["toStatus"], "processing");
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_status_of_missing_order() {
    let pool = pool().await;
    let admin = Admin::login_as(&pool, AdminRole::Admin).await;

    let resp = set_status(&admin, i64::from(i32::MAX), "shipped").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running admin and storefront servers and database"]
async fn test_filter_orders_by_status() {
    let pool = pool().await;
    let admin = Admin::login_as(&pool, AdminRole::Admin).await;
    let order_id = place_order().await;
    set_status(&admin, order_id, "cancelled").await;

    let orders: Value = admin
        .client
        .get(format!("{}/api/admin/orders?status=cancelled", admin_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let orders = orders.as_array().unwrap();
    assert!(orders.iter().all(|o| o["status"] == "cancelled"));
    assert!(orders.iter().any(|o| o["id"] == order_id));
}
