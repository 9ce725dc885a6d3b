//! Database migration commands.
//!
//! Storefront and admin share one database. Each side has its own migration
//! directory, and both record into the same `_sqlx_migrations` table, so
//! each migrator ignores the other's applied versions.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - connection string for the storefront side
//! - `ADMIN_DATABASE_URL` - connection string for the admin side
//! - `DATABASE_URL` - fallback for either
//!
//! # Migration Files
//!
//! Storefront migrations: `crates/storefront/migrations/`
//! Admin migrations: `crates/admin/migrations/`

use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use super::{ConnectError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Session store error: {0}")]
    SessionStore(String),
}

/// Create the shop schema and the customer session table.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails.
pub async fn storefront() -> Result<(), MigrationError> {
    let pool = connect("STOREFRONT_DATABASE_URL").await?;

    tracing::info!("Running storefront migrations...");
    let mut migrator = sqlx::migrate!("../storefront/migrations");
    migrator.set_ignore_missing(true);
    migrator.run(&pool).await?;

    tracing::info!("Creating customer session table...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Storefront migrations complete");
    Ok(())
}

/// Create the admin schema and the admin session table.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails.
pub async fn admin() -> Result<(), MigrationError> {
    let pool = connect("ADMIN_DATABASE_URL").await?;

    tracing::info!("Running admin migrations...");
    let mut migrator = sqlx::migrate!("../admin/migrations");
    migrator.set_ignore_missing(true);
    migrator.run(&pool).await?;

    tracing::info!("Creating admin session table...");
    clothesline_admin::middleware::session::session_store(&pool)
        .map_err(MigrationError::SessionStore)?
        .migrate()
        .await?;

    tracing::info!("Admin migrations complete");
    Ok(())
}
