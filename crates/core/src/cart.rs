//! Cart reconciliation.
//!
//! The cart lives in client storage and is untrusted: between sessions the
//! catalog may have changed underneath it (products deleted, discontinued).
//! [`reconcile`] revalidates a candidate cart against a snapshot of the live
//! catalog, pricing the surviving lines and reporting the dropped product ids
//! as data, not as an error.
//!
//! [`ValidatedLine`] is only constructible through [`reconcile`], so an order
//! can never be created from lines the catalog has not vouched for.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId};

/// One entry of a client-held cart. Unvalidated candidate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLine {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Whether the customer ticked this line for checkout.
    #[serde(default = "default_selected")]
    pub selected: bool,
}

const fn default_selected() -> bool {
    true
}

/// A client-held cart as submitted for reconciliation or checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCart {
    pub lines: Vec<CandidateLine>,
}

impl CandidateCart {
    /// Create a cart from candidate lines.
    #[must_use]
    pub fn new(lines: Vec<CandidateLine>) -> Self {
        Self { lines }
    }

    /// A single-line cart, as produced by the "order now" button.
    #[must_use]
    pub fn single(product_id: ProductId, quantity: u32) -> Self {
        Self {
            lines: vec![CandidateLine {
                product_id,
                quantity,
                selected: true,
            }],
        }
    }
}

/// A cart line vouched for by the catalog: the product existed in the
/// snapshot and its unit price was captured from it.
///
/// Deliberately not deserializable and without a public constructor - the
/// only way to obtain one is [`reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidatedLine {
    product_id: ProductId,
    quantity: u32,
    unit_price: Money,
    selected: bool,
}

impl ValidatedLine {
    /// Product this line references.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Ordered quantity, as submitted by the client.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price captured from the catalog snapshot.
    #[must_use]
    pub const fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Whether the customer ticked this line for checkout.
    #[must_use]
    pub const fn selected(&self) -> bool {
        self.selected
    }
}

/// Outcome of reconciling a candidate cart against a catalog snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Lines that survived, in submission order, priced from the snapshot.
    pub lines: Vec<ValidatedLine>,
    /// Products the catalog no longer knows, in submission order.
    pub dropped_product_ids: Vec<ProductId>,
}

impl Reconciliation {
    /// The surviving lines the customer ticked for checkout.
    #[must_use]
    pub fn selected_lines(&self) -> Vec<ValidatedLine> {
        self.lines.iter().filter(|l| l.selected).copied().collect()
    }

    /// Whether any line was dropped.
    #[must_use]
    pub fn has_drops(&self) -> bool {
        !self.dropped_product_ids.is_empty()
    }
}

/// Reconcile a candidate cart against a catalog snapshot.
///
/// Keeps exactly the lines whose product exists in `catalog` (pricing them
/// from it) and collects the rest into `dropped_product_ids`. Deterministic,
/// order-preserving, no side effects. Run this on every checkout attempt and
/// whenever the client cart is loaded; the caller persists the narrowed cart
/// back to client storage and surfaces the drops.
#[must_use]
pub fn reconcile(cart: &CandidateCart, catalog: &BTreeMap<ProductId, Money>) -> Reconciliation {
    let mut lines = Vec::with_capacity(cart.lines.len());
    let mut dropped_product_ids = Vec::new();

    for candidate in &cart.lines {
        match catalog.get(&candidate.product_id) {
            Some(unit_price) => lines.push(ValidatedLine {
                product_id: candidate.product_id,
                quantity: candidate.quantity,
                unit_price: *unit_price,
                selected: candidate.selected,
            }),
            None => dropped_product_ids.push(candidate.product_id),
        }
    }

    Reconciliation {
        lines,
        dropped_product_ids,
    }
}
