//! Oakline Server - order lifecycle and entitlement engine.
//!
//! # Architecture
//!
//! - Axum HTTP surface mirroring the storefront's order/review API
//! - SQLite via sqlx for the durable store (orders, lines, payments, reviews)
//! - HMAC-signed bearer tokens for caller identity
//!
//! The decision logic (entitlement, cart reconciliation, status graph) lives
//! in `oakline-core`; this crate wires it to storage and the wire.
//!
//! Catalog CRUD, page rendering, and account management are external
//! collaborators: the engine reads `customers` and `products` but never
//! writes them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use error::{AppError, Result};
pub use state::AppState;
