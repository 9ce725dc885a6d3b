//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

/// Read a database URL from `primary`, falling back to `DATABASE_URL`.
fn database_url(primary: &'static str) -> Option<SecretString> {
    dotenvy::dotenv().ok();
    std::env::var(primary)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}

/// Connect using [`database_url`].
async fn connect(primary: &'static str) -> Result<PgPool, ConnectError> {
    let url = database_url(primary).ok_or(ConnectError::MissingEnvVar(primary))?;
    tracing::info!("Connecting to database...");
    Ok(clothesline_admin::db::create_pool(&url).await?)
}

/// Errors raised while opening the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Missing environment variable: {0} (or DATABASE_URL)")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}
