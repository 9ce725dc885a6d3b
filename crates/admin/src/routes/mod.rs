//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (login rate limited)
//! POST   /api/admin/auth/login
//! POST   /api/admin/auth/logout
//! GET    /api/admin/auth/me
//!
//! # Catalog
//! GET    /api/admin/products               ?categoryId=
//! POST   /api/admin/products
//! GET    /api/admin/products/{id}
//! PUT    /api/admin/products/{id}
//! DELETE /api/admin/products/{id}
//! POST   /api/admin/products/{id}/image    multipart `image`
//! GET    /api/admin/categories
//! POST   /api/admin/categories
//! PUT    /api/admin/categories/{id}
//! DELETE /api/admin/categories/{id}
//!
//! # Orders
//! GET    /api/admin/orders                 ?status=
//! GET    /api/admin/orders/{id}
//! PUT    /api/orders/{id}/status
//!
//! # Customers
//! GET    /api/admin/customers
//! GET    /api/admin/customers/{id}
//!
//! # Customer queries
//! GET    /api/admin/queries                ?status=
//! PUT    /api/admin/queries/{id}/status
//! ```
//!
//! Reads need any admin; writes need a role that [`can_write`].
//!
//! [`can_write`]: clothesline_core::AdminRole::can_write

pub mod auth;
pub mod categories;
pub mod customers;
pub mod orders;
pub mod products;
pub mod queries;

use axum::Router;

use crate::state::AppState;

/// Create all API routes for the back office.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    let admin = Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router(max_upload_bytes))
        .nest("/categories", categories::router())
        .nest("/orders", orders::router())
        .nest("/customers", customers::router())
        .nest("/queries", queries::router());

    Router::new()
        .nest("/api/admin", admin)
        .nest("/api/orders", orders::status_router())
}
