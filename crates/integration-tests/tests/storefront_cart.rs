//! Integration tests for the storefront cart.
//!
//! These tests require a running storefront server and database.
//! Run with: `cargo test -p clothesline-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use clothesline_core::Price;
use clothesline_integration_tests::{
    Customer, client, create_product, pool, price, storefront_url,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

// =============================================================================
// Ownership
// =============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_cart_requires_login() {
    let resp = client()
        .get(format!("{}/api/cart/1", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_cart_of_another_user_is_forbidden() {
    let alice = Customer::register().await;
    let bob = Customer::register().await;

    let resp = alice.client.get(bob.cart_url()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Adding and updating lines
// =============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_repeat_add_merges_line() {
    let pool = pool().await;
    let product = create_product(&pool, 2500).await;
    let customer = Customer::register().await;
    let id = product.id.to_string();

    customer.add_to_cart(&id, "M", 1).await;
    let resp = customer.add_to_cart(&id, "M", 2).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cart: Value = resp.json().await.unwrap();
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(cart["itemCount"], 3);
    assert_eq!(price(&cart["subtotal"]), Price::from_cents(7500));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_different_sizes_are_separate_lines() {
    let pool = pool().await;
    let product = create_product(&pool, 1000).await;
    let customer = Customer::register().await;
    let id = product.id.to_string();

    customer.add_to_cart(&id, "S", 1).await;
    let cart: Value = customer.add_to_cart(&id, "L", 1).await.json().await.unwrap();
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_add_rejects_unknown_size_and_product() {
    let pool = pool().await;
    let product = create_product(&pool, 1000).await;
    let customer = Customer::register().await;

    let resp = customer
        .add_to_cart(&product.id.to_string(), "XXXL", 1)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = customer.add_to_cart("PROD-9999", "M", 1).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = customer.add_to_cart("not-an-id", "M", 1).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_zero_quantity_removes_line() {
    let pool = pool().await;
    let product = create_product(&pool, 1000).await;
    let customer = Customer::register().await;
    let id = product.id.to_string();
    customer.add_to_cart(&id, "M", 2).await;

    let line_url = format!("{}/items/{id}", customer.cart_url());
    let resp = customer
        .client
        .put(&line_url)
        .json(&json!({ "quantity": 0, "size": "M" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.unwrap();
    assert!(cart["items"].as_array().unwrap().is_empty());

    // The line is gone, so updating it again is a miss
    let resp = customer
        .client
        .put(&line_url)
        .json(&json!({ "quantity": 1, "size": "M" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_remove_line() {
    let pool = pool().await;
    let product = create_product(&pool, 1000).await;
    let customer = Customer::register().await;
    let id = product.id.to_string();
    customer.add_to_cart(&id, "S", 1).await;
    customer.add_to_cart(&id, "M", 1).await;

    let resp = customer
        .client
        .delete(format!("{}/items/{id}", customer.cart_url()))
        .json(&json!({ "size": "S" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let cart: Value = resp.json().await.unwrap();
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["size"], "M");
}

// =============================================================================
// Clearing
// =============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_clear_empties_but_keeps_cart() {
    let pool = pool().await;
    let product = create_product(&pool, 1000).await;
    let customer = Customer::register().await;
    customer.add_to_cart(&product.id.to_string(), "M", 1).await;

    let resp = customer.client.delete(customer.cart_url()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = customer.client.get(customer.cart_url()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.unwrap();
    assert!(cart["items"].as_array().unwrap().is_empty());
    assert_eq!(price(&cart["subtotal"]), Price::ZERO);
}
