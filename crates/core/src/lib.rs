//! Oakline Core - Shared domain library.
//!
//! This crate provides the domain types and decision logic used across all
//! Oakline components:
//! - `server` - The storefront order engine (HTTP + persistence)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. Everything here is deterministic and
//! testable without infrastructure:
//!
//! - [`types`] - Newtype IDs, money, and the order status state machine
//! - [`identity`] - Caller identity (customer id + role)
//! - [`policy`] - Entitlement predicates ("may this caller do this action")
//! - [`cart`] - Client cart reconciliation against a catalog snapshot

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod identity;
pub mod policy;
pub mod types;

pub use cart::{CandidateCart, CandidateLine, Reconciliation, ValidatedLine};
pub use identity::{Identity, Role};
pub use types::*;
