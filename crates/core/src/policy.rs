//! Entitlement policy.
//!
//! Pure decision functions answering "may this caller act on this resource
//! this way". Every engine operation consults these instead of repeating
//! inline role/ownership comparisons at each call site. No I/O: callers fetch
//! the [`OrderFacts`] the predicates need and pass them in.

use crate::identity::Identity;
use crate::types::{CustomerId, OrderStatus, ProductId};

/// The facts about an order that entitlement decisions depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFacts {
    /// Owner of the order.
    pub customer_id: CustomerId,
    /// Current lifecycle state.
    pub status: OrderStatus,
    /// Products the order's line items reference.
    pub product_ids: Vec<ProductId>,
}

/// Whether the caller owns the order or holds the admin role.
#[must_use]
pub fn owns_or_admin(identity: Identity, order: &OrderFacts) -> bool {
    identity.is(order.customer_id) || identity.role.is_admin()
}

/// Whether the caller may cancel the order.
///
/// Owner or admin, and only while the order is still cancellable
/// (`Pending` or `ToShip`).
#[must_use]
pub fn can_cancel(identity: Identity, order: &OrderFacts) -> bool {
    owns_or_admin(identity, order) && order.status.is_cancellable()
}

/// Whether the caller may reorder the order. Strictly the owner - admins do
/// not place orders on a customer's behalf.
#[must_use]
pub fn can_reorder(identity: Identity, order: &OrderFacts) -> bool {
    identity.is(order.customer_id)
}

/// Whether the caller may list every order in the store.
#[must_use]
pub const fn can_view_all_orders(identity: Identity) -> bool {
    identity.role.is_admin()
}

/// Whether the caller may review `product_id`.
///
/// True iff some order in `orders` is owned by the caller, is `Completed`,
/// and contains a line for the product. Orders in any other state - including
/// `Cancelled` orders that once held the product - do not qualify.
#[must_use]
pub fn can_review(identity: Identity, product_id: ProductId, orders: &[OrderFacts]) -> bool {
    orders.iter().any(|order| {
        identity.is(order.customer_id)
            && order.status == OrderStatus::Completed
            && order.product_ids.contains(&product_id)
    })
}
