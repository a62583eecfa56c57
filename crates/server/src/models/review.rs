//! Review domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use oakline_core::{CustomerId, ProductId, ReviewId};

/// A product review. Unique per `(customer_id, product_id)`: a second
/// submission overwrites rather than duplicates.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    /// Star rating in `1..=5`.
    pub rating: u8,
    pub comment: String,
    pub updated_at: DateTime<Utc>,
    /// Reviewer display name for public projections; "Anonymous" if the
    /// account is gone.
    pub customer_name: String,
}

/// Whether a submission created a new review or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitOutcome {
    Created,
    Updated,
}
