//! Database operations for the order engine.
//!
//! # Tables
//!
//! - `customers` - account store (read-only here; seeded by the CLI)
//! - `products` - catalog reference (read-only here)
//! - `orders` / `order_lines` / `payments` - the order ledger
//! - `reviews` - one per (customer, product) pair
//!
//! All queries use the runtime sqlx API against SQLite; migrations are
//! embedded from `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p ol-cli -- migrate
//! ```

use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub mod customers;
pub mod orders;
pub mod products;
pub mod reviews;

pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;

/// Embedded migrations for the engine database.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Error from a repository operation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The referenced row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A concurrent mutation won the race, or a uniqueness constraint fired.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value failed to parse back into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a SQLite connection pool with sensible defaults.
///
/// Foreign keys are enforced per connection; the database file is created if
/// missing.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Run the embedded migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
