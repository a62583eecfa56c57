//! Review gate service.
//!
//! Decides whether a (customer, product) pair may create or update a review:
//! only customers with a Completed order containing the product qualify, and
//! each pair holds at most one review (resubmission overwrites).

use sqlx::SqlitePool;
use tracing::instrument;

use oakline_core::{Identity, ProductId, policy};

use crate::db::{OrderRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::models::{Review, SubmitOutcome};

/// Service for review operations.
pub struct ReviewService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReviewService<'a> {
    /// Create a new review service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Submit a review, creating it or overwriting the caller's existing one.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the rating is outside `1..=5`; `Forbidden` if the
    /// caller has no Completed order containing the product.
    #[instrument(skip(self, comment), fields(customer = %identity.id, product = %product_id))]
    pub async fn submit(
        &self,
        identity: Identity,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<(Review, SubmitOutcome)> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::InvalidArgument(format!(
                "rating must be between 1 and 5, got {rating}"
            )));
        }

        let orders = OrderRepository::new(self.pool)
            .facts_for_customer(identity.id)
            .await?;
        if !policy::can_review(identity, product_id, &orders) {
            return Err(AppError::Forbidden(
                "only customers with a completed order for this product may review it".to_owned(),
            ));
        }

        let (review, outcome) = ReviewRepository::new(self.pool)
            .upsert(identity.id, product_id, rating, comment)
            .await?;

        tracing::info!(review = %review.id, ?outcome, "review submitted");
        Ok((review, outcome))
    }

    /// Public listing of a product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the query fails.
    pub async fn list_for_product(&self, product_id: ProductId) -> Result<Vec<Review>> {
        Ok(ReviewRepository::new(self.pool)
            .list_for_product(product_id)
            .await?)
    }
}
