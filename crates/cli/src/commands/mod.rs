//! CLI command implementations.

pub mod migrate;
pub mod session;

use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Session repository error.
    #[error("{0}")]
    Repository(#[from] shop_bridge_api::db::RepositoryError),

    /// Invalid shop domain.
    #[error("Invalid shop: {0}")]
    InvalidShop(#[from] shop_bridge_core::ShopDomainError),

    /// Invalid argument.
    #[error("{0}")]
    InvalidArgument(String),

    /// Requested record does not exist.
    #[error("{0}")]
    NotFound(String),
}

/// Connect to the database named by `DATABASE_URL`.
async fn connect() -> Result<sqlx::PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(secrecy::SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(shop_bridge_api::db::create_pool(&database_url).await?)
}
