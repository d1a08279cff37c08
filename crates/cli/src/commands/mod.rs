//! Subcommand implementations.
//!
//! # Environment Variables
//!
//! - `EMPORIUM_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

pub mod customer;
pub mod migrate;
pub mod product;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use emporium_api::db;
use emporium_api::schema::OperationError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The operation was rejected.
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// A soft failure reported by the operation itself.
    #[error("{0}")]
    Unsuccessful(String),

    /// Seed file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Seed file is not valid JSON of the expected shape.
    #[error("Invalid seed file: {0}")]
    Json(#[from] serde_json::Error),

    /// A seed file entry fails the product field limits.
    #[error("Invalid seed entry {index}: {source}")]
    InvalidEntry {
        index: usize,
        source: OperationError,
    },
}

/// Connect to the database named by the environment.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("EMPORIUM_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("EMPORIUM_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
