//! Business logic services for the back office.
//!
//! # Services
//!
//! - `auth` - Email and password login for admin accounts
//! - `uploads` - Product image storage on local disk

pub mod auth;
pub mod uploads;

pub use auth::{AdminAuthError, AdminAuthService};
pub use uploads::{ImageStore, UploadError};
