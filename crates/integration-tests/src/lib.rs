//! Integration tests for Clothesline.
//!
//! The tests talk to running servers over HTTP and use the database
//! directly only to create fixtures (products, admin accounts) that have no
//! public endpoint.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and both servers, then
//! cargo test -p clothesline-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `STOREFRONT_URL` - defaults to `http://localhost:3000`
//! - `ADMIN_URL` - defaults to `http://localhost:3001`
//! - `DATABASE_URL` - required for fixtures
#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;

use clothesline_admin::db::ProductRepository;
use clothesline_admin::services::AdminAuthService;
use clothesline_core::{AdminRole, Price, Product, ProductDraft};

/// Password used for every account the tests create.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Base URL of the storefront server.
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL of the admin server.
#[must_use]
pub fn admin_url() -> String {
    std::env::var("ADMIN_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// An HTTP client that keeps session cookies between requests.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build HTTP client")
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Connect to the shared database for fixtures.
pub async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    clothesline_admin::db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to database")
}

/// Insert a product sold in S, M and L.
pub async fn create_product(pool: &PgPool, cents: u32) -> Product {
    let draft = ProductDraft {
        name: format!("Test Tee {}", uuid::Uuid::new_v4().simple()),
        description: "Integration test product".to_string(),
        price: Price::from_cents(cents),
        category_id: None,
        sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
        size_type: None,
        image_url: None,
        stock_quantity: 10,
    };
    ProductRepository::new(pool)
        .create(&draft)
        .await
        .expect("Failed to create product")
}

/// A storefront customer with a logged-in client.
pub struct Customer {
    pub client: Client,
    pub id: i64,
    pub email: String,
}

impl Customer {
    /// Register a fresh customer; registration also logs them in.
    pub async fn register() -> Self {
        let client = client();
        let email = unique_email("shopper");
        let resp = client
            .post(format!("{}/api/auth/register", storefront_url()))
            .json(&json!({
                "name": "Test Shopper",
                "email": email,
                "password": TEST_PASSWORD,
            }))
            .send()
            .await
            .expect("Failed to register");
        assert_eq!(resp.status(), StatusCode::CREATED);

        let user: Value = resp.json().await.expect("Invalid register response");
        let id = user["id"].as_i64().expect("user id");
        Self { client, id, email }
    }

    /// URL of this customer's cart.
    #[must_use]
    pub fn cart_url(&self) -> String {
        format!("{}/api/cart/{}", storefront_url(), self.id)
    }

    /// Add `quantity` of `product_id` in `size` and return the response.
    pub async fn add_to_cart(&self, product_id: &str, size: &str, quantity: i64) -> reqwest::Response {
        self.client
            .post(format!("{}/items", self.cart_url()))
            .json(&json!({
                "productId": product_id,
                "size": size,
                "quantity": quantity,
            }))
            .send()
            .await
            .expect("Failed to add to cart")
    }
}

/// Read a money field from a JSON response.
#[must_use]
pub fn price(value: &Value) -> Price {
    serde_json::from_value(value.clone()).expect("Invalid price")
}

/// Shipping details that pass validation.
#[must_use]
pub fn shipping_info() -> Value {
    json!({
        "fullName": "Test Shopper",
        "email": "shopper@example.com",
        "phone": "555-0100",
        "address": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "postalCode": "62701",
        "country": "US",
    })
}

/// A back-office account with a logged-in client.
pub struct Admin {
    pub client: Client,
    pub email: String,
}

impl Admin {
    /// Create an account with `role` directly in the database and log in.
    pub async fn login_as(pool: &PgPool, role: AdminRole) -> Self {
        let email = unique_email("admin");
        AdminAuthService::new(pool)
            .create_admin(&email, "Test Admin", role, TEST_PASSWORD)
            .await
            .expect("Failed to create admin");

        let client = client();
        let resp = client
            .post(format!("{}/api/admin/auth/login", admin_url()))
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .send()
            .await
            .expect("Failed to log in");
        assert_eq!(resp.status(), StatusCode::OK);

        Self { client, email }
    }
}
