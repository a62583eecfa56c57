//! Shared harness for integration tests: an in-memory database with the
//! full schema applied, plus seeding helpers.

#![allow(dead_code)]

use chrono::Utc;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

use oakline_core::{CustomerId, ProductId};
use oakline_server::db::MIGRATOR;

/// A fresh in-memory database with migrations applied.
///
/// Pinned to a single connection so every query sees the same in-memory
/// store.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    pool
}

/// Insert a customer with an unusable password hash (for tests that never
/// log in through the API).
pub async fn insert_customer(pool: &SqlitePool, name: &str, email: &str, role: &str) -> CustomerId {
    insert_customer_with_password_hash(pool, name, email, role, "!unusable!").await
}

/// Insert a customer with a specific stored password hash.
pub async fn insert_customer_with_password_hash(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    role: &str,
    password_hash: &str,
) -> CustomerId {
    let id = sqlx::query(
        "INSERT INTO customers (name, email, password_hash, role, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("Failed to insert customer")
    .last_insert_rowid();

    CustomerId::new(id)
}

/// Insert a catalog product priced in cents.
pub async fn insert_product(
    pool: &SqlitePool,
    name: &str,
    price_cents: i64,
    stock: i64,
) -> ProductId {
    let id = sqlx::query("INSERT INTO products (name, price_cents, stock_quantity) VALUES (?1, ?2, ?3)")
        .bind(name)
        .bind(price_cents)
        .bind(stock)
        .execute(pool)
        .await
        .expect("Failed to insert product")
        .last_insert_rowid();

    ProductId::new(id)
}

/// Overwrite a product's catalog price.
pub async fn set_product_price(pool: &SqlitePool, product_id: ProductId, price_cents: i64) {
    sqlx::query("UPDATE products SET price_cents = ?1 WHERE id = ?2")
        .bind(price_cents)
        .bind(product_id)
        .execute(pool)
        .await
        .expect("Failed to update product price");
}
