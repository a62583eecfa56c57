//! Order domain types.
//!
//! An order is three co-located records: the header, its line items, and one
//! payment. They are created together in a single transaction; afterwards the
//! header mutates only through status transitions, the lines never, and the
//! payment only in its settlement status.

use chrono::{DateTime, Utc};
use serde::Serialize;

use oakline_core::{
    CustomerId, Money, OrderId, OrderLineId, OrderStatus, PaymentId, PaymentMethod, PaymentStatus,
    ProductId,
};

/// Order header.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    /// Immutable after creation: ownership never moves.
    pub customer_id: CustomerId,
    /// Short human-facing code shown in listings.
    pub reference: String,
    pub status: OrderStatus,
    /// Optimistic concurrency token; bumped on every status mutation.
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

/// One product-quantity-price entry belonging to exactly one order.
///
/// `unit_price` is snapshotted at order creation and never recomputed from
/// the current catalog price.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

/// Payment record, one-to-one with its order.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub method: PaymentMethod,
    pub total_amount: Money,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// One line of an order summary projection.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryLine {
    pub product_id: ProductId,
    /// Display name at read time; "Unknown Product" if the catalog entry is gone.
    pub name: String,
    pub quantity: u32,
}

/// Read projection of an order for listings.
///
/// Carries what the account pages show: line summary, payment method, total,
/// status, date. `customer_name` is filled only for the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub reference: String,
    pub customer_id: CustomerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub status: OrderStatus,
    pub date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub total: Money,
    pub lines: Vec<SummaryLine>,
}

impl OrderSummary {
    /// Flat description of the ordered products, e.g. `2x Oak Desk, 1x Fern Stand`.
    #[must_use]
    pub fn products_string(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{}x {}", l.quantity, l.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
