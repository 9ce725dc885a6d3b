//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (rate limited)
//! POST   /api/auth/register
//! POST   /api/auth/login
//! POST   /api/auth/logout
//! GET    /api/auth/me
//! POST   /api/auth/forgot-password
//! POST   /api/auth/reset-password
//!
//! # Catalog
//! GET    /api/products                      ?category=&q=&page=&perPage=
//! GET    /api/products/{id}
//! GET    /api/categories
//!
//! # Cart (owner only)
//! GET    /api/cart/{userId}
//! DELETE /api/cart/{userId}
//! POST   /api/cart/{userId}/items
//! PUT    /api/cart/{userId}/items/{productId}
//! DELETE /api/cart/{userId}/items/{productId}
//!
//! # Orders (owner only)
//! POST   /api/orders
//! GET    /api/orders/{id}
//! GET    /api/orders/user/{userId}
//!
//! # Contact
//! POST   /api/queries
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod queries;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(categories::index))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(cart::show).delete(cart::clear))
        .route("/{user_id}/items", post(cart::add_item))
        .route(
            "/{user_id}/items/{product_id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/user/{user_id}", get(orders::list_for_user))
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/auth", auth_routes().layer(auth_rate_limiter()))
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .route("/queries", post(queries::create))
        .layer(api_rate_limiter());

    Router::new().nest("/api", api)
}
