//! Domain models for the back office.

pub mod admin_user;
pub mod customer;
pub mod order;
pub mod session;

pub use admin_user::{AdminRole, AdminUser};
pub use customer::{CustomerDetail, CustomerSummary};
pub use order::{OrderDetail, OrderStatusEvent, StatusChange};
pub use session::{CurrentAdmin, keys as session_keys};
