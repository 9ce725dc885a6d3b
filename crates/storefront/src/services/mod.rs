//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, login and password reset
//! - `cart` - Cart mutations under a row lock
//! - `checkout` - Order placement with price snapshots
//! - `email` - Transactional email (order confirmation, password reset)

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod email;

pub use auth::{AuthError, AuthService};
pub use cart::CartService;
pub use checkout::{CheckoutService, PlaceOrder};
pub use email::EmailService;
