//! Customer repository.
//!
//! The account store is an external collaborator: the engine resolves bearer
//! credentials against it and decorates admin order listings with customer
//! names, but never writes to it.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use oakline_core::{CustomerId, Role};

use super::RepositoryError;
use crate::models::Customer;

/// Repository for customer lookups.
pub struct CustomerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` if the stored role is invalid.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, name, email, role, created_at
            FROM customers
            WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(map_customer).transpose()
    }

    /// Get a customer and their password hash by email, for login.
    ///
    /// Returns `None` if no account has that email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &str,
    ) -> Result<Option<(Customer, String)>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, name, email, role, created_at, password_hash
            FROM customers
            WHERE email = ?1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let hash: String = row.try_get("password_hash")?;
        let customer = map_customer(row)?;
        Ok(Some((customer, hash)))
    }
}

fn map_customer(row: sqlx::sqlite::SqliteRow) -> Result<Customer, RepositoryError> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<Role>()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid role in database: {e}")))?;

    Ok(Customer {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
