//! Review repository.
//!
//! One review per `(customer_id, product_id)` - enforced both here (read
//! then insert-or-update inside a transaction) and by the schema's UNIQUE
//! constraint as a backstop. Two racing submissions for the same pair
//! resolve as one winner and one `Conflict`, never a storage error.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use oakline_core::{CustomerId, ProductId, ReviewId};

use super::RepositoryError;
use crate::models::{Review, SubmitOutcome};

/// Repository for review operations.
pub struct ReviewRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a review for `(customer_id, product_id)`, or overwrite the
    /// existing one's rating, comment, and timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a concurrent submission for the
    /// same pair won the race (the UNIQUE constraint fires, or SQLite reports
    /// the transactions busy/deadlocked) - safe for the caller to retry.
    /// Returns `RepositoryError::Database` for other failures.
    pub async fn upsert(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<(Review, SubmitOutcome), RepositoryError> {
        self.try_upsert(customer_id, product_id, rating, comment)
            .await
            .map_err(|e| {
                if is_contention(&e) {
                    return RepositoryError::Conflict(format!(
                        "review for customer {customer_id} and product {product_id} \
                         was submitted concurrently"
                    ));
                }
                RepositoryError::Database(e)
            })
    }

    async fn try_upsert(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<(Review, SubmitOutcome), sqlx::Error> {
        let updated_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> = sqlx::query(
            r"
            SELECT id FROM reviews
            WHERE customer_id = ?1 AND product_id = ?2
            ",
        )
        .bind(customer_id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .map(|row| row.try_get("id"))
        .transpose()?;

        let (review_id, outcome) = match existing {
            Some(id) => {
                sqlx::query(
                    r"
                    UPDATE reviews
                    SET rating = ?1, comment = ?2, updated_at = ?3
                    WHERE id = ?4
                    ",
                )
                .bind(i64::from(rating))
                .bind(comment)
                .bind(updated_at)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                (id, SubmitOutcome::Updated)
            }
            None => {
                let id = sqlx::query(
                    r"
                    INSERT INTO reviews (customer_id, product_id, rating, comment, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ",
                )
                .bind(customer_id)
                .bind(product_id)
                .bind(i64::from(rating))
                .bind(comment)
                .bind(updated_at)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();
                (id, SubmitOutcome::Created)
            }
        };

        let name: Option<String> =
            sqlx::query("SELECT name FROM customers WHERE id = ?1")
                .bind(customer_id)
                .fetch_optional(&mut *tx)
                .await?
                .map(|row| row.try_get("name"))
                .transpose()?;

        tx.commit().await?;

        Ok((
            Review {
                id: ReviewId::new(review_id),
                customer_id,
                product_id,
                rating,
                comment: comment.to_owned(),
                updated_at,
                customer_name: name.unwrap_or_else(|| "Anonymous".to_owned()),
            },
            outcome,
        ))
    }

    /// All reviews for a product, newest first, with reviewer display names.
    ///
    /// Public projection - an unknown product simply yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT r.id, r.customer_id, r.product_id, r.rating, r.comment, r.updated_at,
                   c.name AS customer_name
            FROM reviews r
            LEFT JOIN customers c ON c.id = r.customer_id
            WHERE r.product_id = ?1
            ORDER BY r.updated_at DESC, r.id DESC
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(map_review).collect()
    }
}

/// Whether the error is a losing race rather than a real storage failure:
/// the pair's UNIQUE constraint fired, or SQLite reported the transaction
/// busy or deadlocked (primary result codes 5 and 6).
fn is_contention(err: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db_err) = err else {
        return false;
    };
    if db_err.is_unique_violation() {
        return true;
    }
    db_err
        .code()
        .and_then(|code| code.parse::<u32>().ok())
        .is_some_and(|code| matches!(code & 0xff, 5 | 6))
}

fn map_review(row: SqliteRow) -> Result<Review, RepositoryError> {
    let rating: i64 = row.try_get("rating")?;
    let rating = u8::try_from(rating)
        .map_err(|_| RepositoryError::DataCorruption(format!("invalid rating: {rating}")))?;

    Ok(Review {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        product_id: row.try_get("product_id")?,
        rating,
        comment: row.try_get("comment")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        customer_name: row
            .try_get::<Option<String>, _>("customer_name")?
            .unwrap_or_else(|| "Anonymous".to_owned()),
    })
}
