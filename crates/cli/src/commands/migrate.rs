//! Database migration command.
//!
//! Applies the embedded migrations from `crates/server/migrations/` to the
//! database named by `OAKLINE_DATABASE_URL`, creating the file if needed.

use super::{CliError, connect};

/// Run all pending migrations.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    oakline_server::db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
