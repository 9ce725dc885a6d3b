//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! clothesline-cli admin create -e admin@example.com -n "Admin Name" -r super_admin -p '<password>'
//! ```
//!
//! The password may also come from `ADMIN_PASSWORD`.

use clothesline_admin::services::{AdminAuthError, AdminAuthService};
use clothesline_core::{AdminRole, AdminUserId};
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    /// Email, name or password rejected, or the email is taken.
    #[error("{0}")]
    Auth(#[from] AdminAuthError),
}

/// Create a new admin user.
///
/// # Returns
///
/// The ID of the created admin user.
///
/// # Errors
///
/// Returns `AdminError` for an unknown role, invalid input, a duplicate
/// email, or a database failure.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<AdminUserId, AdminError> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;

    let pool = connect("ADMIN_DATABASE_URL").await?;

    tracing::info!("Creating admin user: {} ({})", email, role);
    let admin = AdminAuthService::new(&pool)
        .create_admin(email, name, role, password)
        .await?;

    tracing::info!(
        "Admin user created. ID: {}, Email: {}, Role: {}",
        admin.id,
        admin.email,
        admin.role
    );
    Ok(admin.id)
}
