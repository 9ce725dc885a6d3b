//! Domain models for the storefront.
//!
//! Catalog, order and query records are shared with the admin binary and live
//! in `clothesline_core`; the types here are storefront-only.

pub mod cart;
pub mod session;
pub mod user;

pub use cart::{Cart, CartItemView, CartView};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
