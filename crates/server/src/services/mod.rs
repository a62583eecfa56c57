//! Engine services.
//!
//! Each service wires the pure decision logic in `oakline-core` to the
//! repositories: authentication, the order lifecycle, and the review gate.

pub mod auth;
pub mod orders;
pub mod reviews;

pub use auth::{AuthError, IdentityGuard};
pub use orders::{CheckoutReceipt, OrderService};
pub use reviews::ReviewService;
