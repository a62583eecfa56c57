//! Product repository.
//!
//! Catalog reads only. Checkout takes a snapshot of the products a cart
//! references at the start of the request and reconciles against that
//! snapshot - never line-by-line against a catalog that could change
//! mid-request.

use std::collections::BTreeMap;

use sqlx::{Row, SqlitePool};

use oakline_core::{Money, ProductId};

use super::RepositoryError;

/// Repository for catalog lookups.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Snapshot of the live catalog as `product id -> unit price`.
    ///
    /// Taken once at the start of checkout and handed to the reconciler.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn price_snapshot(&self) -> Result<BTreeMap<ProductId, Money>, RepositoryError> {
        let rows = sqlx::query("SELECT id, price_cents FROM products")
            .fetch_all(self.pool)
            .await?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let id: ProductId = row.try_get("id")?;
            let cents: i64 = row.try_get("price_cents")?;
            snapshot.insert(id, Money::from_cents(cents));
        }
        Ok(snapshot)
    }
}
