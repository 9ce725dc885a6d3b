//! Clothesline Core - Shared domain types.
//!
//! This crate provides the types used across all Clothesline components:
//! - `storefront` - Customer-facing shopping API
//! - `admin` - Back-office API for catalog and order management
//! - `cli` - Command-line tools for migrations, seeding and admin users
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Cart line merging and order snapshot rules live here so
//! both binaries (and their tests) agree on them.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, product codes and status enums
//! - [`cart`] - Cart line items and the merge-on-add rules
//! - [`order`] - Order item snapshots, shipping details and totals
//! - [`catalog`] - Products and categories
//! - [`query`] - Customer queries from the contact form

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod query;
pub mod types;

pub use cart::{CartError, CartLine, CartLines, LineKey, QuantityUpdate};
pub use catalog::{CatalogError, Category, CategoryDraft, Product, ProductDraft};
pub use order::{Order, OrderError, OrderItem, OrderTotals, ShippingInfo};
pub use query::{CustomerQuery, NewCustomerQuery, QueryError, ValidQuery};
pub use types::*;
