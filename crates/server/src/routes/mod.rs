//! HTTP route handlers.
//!
//! Handlers are thin: extract the caller identity, deserialize the payload,
//! and delegate to the services. All authorization lives in the entitlement
//! policy consulted by the services, never inline here.

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod orders;
pub mod reviews;

/// Build the engine's router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/login", post(auth::login))
        .route("/api/cart/reconcile", post(cart::reconcile))
        .route("/api/checkout", post(orders::checkout))
        .route("/api/products/{id}/order", post(orders::quick_order))
        .route("/api/orders", get(orders::list_all))
        .route("/api/orders/{id}/cancel", put(orders::cancel))
        .route("/api/orders/{id}/reorder", post(orders::reorder))
        .route("/api/orders/{id}/status", put(orders::advance_status))
        .route("/api/profile/me/orders", get(orders::list_mine))
        .route("/api/reviews", post(reviews::submit))
        .route("/api/products/{id}/reviews", get(reviews::list_for_product))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
