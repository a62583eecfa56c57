//! Domain models for the order engine.
//!
//! These are validated domain objects, separate from database row shapes.

pub mod order;
pub mod review;

use chrono::{DateTime, Utc};

use oakline_core::{CustomerId, Role};

pub use order::{Order, OrderLine, OrderSummary, Payment, SummaryLine};
pub use review::{Review, SubmitOutcome};

/// A customer account (read-only to the engine; the account store owns it).
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
