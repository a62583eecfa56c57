//! Database seeding command.
//!
//! Inserts a small furniture catalog plus two demo accounts (one customer,
//! one admin). Safe to re-run: accounts are keyed on email and the catalog
//! is only inserted into an empty products table.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use super::{CliError, connect};

/// Demo catalog: name, price in cents, stock.
const CATALOG: &[(&str, i64, i64)] = &[
    ("Oakline Walnut Coffee Table", 24_900, 12),
    ("Linen Three-Seat Sofa", 89_900, 4),
    ("Rattan Accent Chair", 31_500, 9),
    ("Solid Oak Bed Frame (Queen)", 74_900, 6),
    ("Cedar Nightstand", 15_900, 20),
    ("Extendable Dining Table", 64_900, 5),
    ("Windsor Dining Chair", 12_900, 24),
    ("Walnut Bookshelf", 28_900, 10),
];

/// Seed the catalog and demo accounts.
pub async fn run(password: &str) -> Result<(), CliError> {
    let pool = connect().await?;

    oakline_server::db::run_migrations(&pool).await?;

    seed_catalog(&pool).await?;
    seed_account(&pool, "Demo Customer", "demo@oakline.shop", password, "customer").await?;
    seed_account(&pool, "Demo Admin", "admin@oakline.shop", password, "admin").await?;

    tracing::info!("Seeding complete");
    Ok(())
}

async fn seed_catalog(pool: &SqlitePool) -> Result<(), CliError> {
    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM products")
        .fetch_one(pool)
        .await?
        .try_get("n")?;

    if count > 0 {
        tracing::info!(products = count, "Catalog already seeded, skipping");
        return Ok(());
    }

    for (name, price_cents, stock) in CATALOG {
        sqlx::query("INSERT INTO products (name, price_cents, stock_quantity) VALUES (?, ?, ?)")
            .bind(name)
            .bind(price_cents)
            .bind(stock)
            .execute(pool)
            .await?;
    }

    tracing::info!(products = CATALOG.len(), "Catalog seeded");
    Ok(())
}

async fn seed_account(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> Result<(), CliError> {
    let password_hash =
        oakline_server::services::auth::hash_password(password).map_err(CliError::Hash)?;

    let result = sqlx::query(
        "INSERT INTO customers (name, email, password_hash, role, created_at) \
         VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(name)
    .bind(email)
    .bind(&password_hash)
    .bind(role)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        tracing::info!(email, "Account already exists, skipping");
    } else {
        tracing::info!(email, role, "Account seeded");
    }
    Ok(())
}
