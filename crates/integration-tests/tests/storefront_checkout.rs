//! Integration tests for checkout and order history.
//!
//! These tests require a running storefront server and database.
//! Run with: `cargo test -p clothesline-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use clothesline_admin::db::ProductRepository;
use clothesline_core::{Price, Product, ProductDraft};
use clothesline_integration_tests::{
    Customer, create_product, pool, price, shipping_info, storefront_url,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

fn order_body(customer: &Customer, product: &Product, quantity: u32, subtotal: Price) -> Value {
    let delivery_fee = Price::from_cents(500);
    json!({
        "userId": customer.id,
        "items": [{
            "productId": product.id,
            "size": "M",
            "sizeType": "standard",
            "quantity": quantity,
        }],
        "shippingInfo": shipping_info(),
        "paymentMethod": "card",
        "subtotal": subtotal,
        "deliveryFee": delivery_fee,
        "orderTotal": subtotal + delivery_fee,
    })
}

async fn place(customer: &Customer, body: &Value) -> reqwest::Response {
    customer
        .client
        .post(format!("{}/api/orders", storefront_url()))
        .json(body)
        .send()
        .await
        .unwrap()
}

// =============================================================================
// Placing orders
// =============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_checkout_creates_order_and_clears_cart() {
    let pool = pool().await;
    let product = create_product(&pool, 2000).await;
    let customer = Customer::register().await;
    customer.add_to_cart(&product.id.to_string(), "M", 2).await;

    let resp = place(&customer, &order_body(&customer, &product, 2, Price::from_cents(4000))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["orderId"], body["order"]["id"]);
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["order"]["items"][0]["name"], product.name.as_str());

    let cart: Value = customer
        .client
        .get(customer.cart_url())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_empty_checkout_rejected() {
    let customer = Customer::register().await;
    let body = json!({
        "userId": customer.id,
        "items": [],
        "shippingInfo": shipping_info(),
        "paymentMethod": "upi",
        "subtotal": "0.00",
        "deliveryFee": "0.00",
        "orderTotal": "0.00",
    });

    let resp = place(&customer, &body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_checkout_for_another_user_forbidden() {
    let pool = pool().await;
    let product = create_product(&pool, 1000).await;
    let alice = Customer::register().await;
    let bob = Customer::register().await;

    let resp = place(&alice, &order_body(&bob, &product, 1, Price::from_cents(1000))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_submitted_totals_stored_as_submitted() {
    let pool = pool().await;
    let product = create_product(&pool, 3000).await;
    let customer = Customer::register().await;

    // Claims a subtotal lower than the catalog price
    let resp = place(&customer, &order_body(&customer, &product, 1, Price::from_cents(100))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(price(&body["order"]["subtotal"]), Price::from_cents(100));
    assert_eq!(price(&body["order"]["orderTotal"]), Price::from_cents(600));
    assert_eq!(
        price(&body["order"]["items"][0]["price"]),
        Price::from_cents(3000)
    );
}

// =============================================================================
// Snapshots and history
// =============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_order_keeps_price_after_catalog_change() {
    let pool = pool().await;
    let product = create_product(&pool, 1500).await;
    let customer = Customer::register().await;

    let resp = place(&customer, &order_body(&customer, &product, 1, Price::from_cents(1500))).await;
    let placed: Value = resp.json().await.unwrap();
    let order_id = placed["orderId"].as_i64().unwrap();

    let draft = ProductDraft {
        name: format!("{} (renamed)", product.name),
        description: product.description.clone(),
        price: Price::from_cents(9900),
        category_id: product.category_id,
        sizes: product.sizes.clone(),
        size_type: Some(product.size_type),
        image_url: None,
        stock_quantity: product.stock_quantity,
    };
    ProductRepository::new(&pool)
        .update(&product.id, &draft)
        .await
        .unwrap();

    let order: Value = customer
        .client
        .get(format!("{}/api/orders/{order_id}", storefront_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(order["items"][0]["name"], product.name.as_str());
    assert_eq!(price(&order["items"][0]["price"]), Price::from_cents(1500));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_order_of_another_user_forbidden() {
    let pool = pool().await;
    let product = create_product(&pool, 1000).await;
    let alice = Customer::register().await;
    let bob = Customer::register().await;

    let placed: Value = place(&alice, &order_body(&alice, &product, 1, Price::from_cents(1000)))
        .await
        .json()
        .await
        .unwrap();
    let order_id = placed["orderId"].as_i64().unwrap();

    let resp = bob
        .client
        .get(format!("{}/api/orders/{order_id}", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = bob
        .client
        .get(format!("{}/api/orders/user/{}", storefront_url(), alice.id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_order_history_newest_first() {
    let pool = pool().await;
    let product = create_product(&pool, 1000).await;
    let customer = Customer::register().await;

    for quantity in 1..=2 {
        let body = order_body(&customer, &product, quantity, Price::from_cents(1000 * quantity));
        assert_eq!(place(&customer, &body).await.status(), StatusCode::CREATED);
    }

    let orders: Value = customer
        .client
        .get(format!("{}/api/orders/user/{}", storefront_url(), customer.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["items"][0]["quantity"], 2);
}
