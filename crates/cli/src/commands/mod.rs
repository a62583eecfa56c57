//! CLI command implementations.

pub mod migrate;
pub mod seed;

use sqlx::SqlitePool;

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Password hashing error: {0}")]
    Hash(String),
}

/// Connect to the database named by `OAKLINE_DATABASE_URL`.
pub async fn connect() -> Result<SqlitePool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("OAKLINE_DATABASE_URL")
        .map_err(|_| CliError::MissingEnvVar("OAKLINE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = oakline_server::db::create_pool(&database_url).await?;
    Ok(pool)
}
