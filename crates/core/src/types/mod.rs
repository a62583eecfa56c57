//! Core types for Oakline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod status;

pub use id::*;
pub use money::Money;
pub use status::{OrderStatus, PaymentMethod, PaymentStatus, TransitionError};
