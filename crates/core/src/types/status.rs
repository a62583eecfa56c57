//! Order and payment status types.
//!
//! [`OrderStatus`] owns the order state machine:
//!
//! ```text
//! Pending ──► ToShip ──► ToReceive ──► Completed
//!    │           │
//!    ▼           ▼
//! Cancelled   Cancelled
//! ```
//!
//! `Completed` and `Cancelled` are terminal. The wire/storage spelling uses
//! the customer-facing labels ("To Ship", "To Receive") so projections read
//! the way the shop displays them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Requested status change is not an edge of the state graph.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid order status transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    #[serde(rename = "To Ship")]
    ToShip,
    #[serde(rename = "To Receive")]
    ToReceive,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// All states reachable from `self` in one step.
    #[must_use]
    pub const fn successors(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::ToShip, Self::Cancelled],
            Self::ToShip => &[Self::ToReceive, Self::Cancelled],
            Self::ToReceive => &[Self::Completed],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Whether `target` is reachable from `self` in one step.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self.successors().contains(&target)
    }

    /// Whether `target` is a forward (non-cancelling) edge from `self`.
    ///
    /// Admin status advancement is restricted to these edges; reaching
    /// `Cancelled` goes through the cancel operation instead.
    #[must_use]
    pub fn is_forward_edge_to(self, target: Self) -> bool {
        target != Self::Cancelled && self.can_transition_to(target)
    }

    /// Whether the order may still be cancelled from this state.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::ToShip)
    }

    /// Whether this state has no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::ToShip => write!(f, "To Ship"),
            Self::ToReceive => write!(f, "To Receive"),
            Self::Completed => write!(f, "Completed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "To Ship" => Ok(Self::ToShip),
            "To Receive" => Ok(Self::ToReceive),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Settlement state of an order's payment record.
///
/// May flip `Unpaid` -> `Paid` out of band; the engine never moves it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpaid => write!(f, "Unpaid"),
            Self::Paid => write!(f, "Paid"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unpaid" => Ok(Self::Unpaid),
            "Paid" => Ok(Self::Paid),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// Payment method label.
///
/// A label, not a processed instrument - no gateway integration. Only
/// "Cash on Delivery" carries semantics (it starts the payment `Unpaid`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    /// Label used for reordered orders before the customer picks a method.
    pub const PENDING_LABEL: &'static str = "Pending";

    /// Create a payment method from its label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Placeholder method for reorders.
    #[must_use]
    pub fn pending() -> Self {
        Self(Self::PENDING_LABEL.to_owned())
    }

    /// Get the label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this method settles on delivery (payment starts `Unpaid`).
    #[must_use]
    pub fn is_cash_on_delivery(&self) -> bool {
        self.0 == "Cash on Delivery"
    }

    /// Initial settlement state for a new order paid with this method.
    ///
    /// Non-COD methods are treated as settled up front - a simplification
    /// standing in for real gateway settlement.
    #[must_use]
    pub fn initial_payment_status(&self) -> PaymentStatus {
        if self.is_cash_on_delivery() {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::Paid
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
