//! Cart reconciliation route.
//!
//! The cart is client-held; this endpoint revalidates it against the live
//! catalog so the client can narrow its stored cart and tell the customer
//! which products disappeared.

use axum::{Json, extract::State};

use oakline_core::{CandidateCart, Reconciliation};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::OrderService;
use crate::state::AppState;

/// `POST /api/cart/reconcile`
pub async fn reconcile(
    State(state): State<AppState>,
    RequireAuth(_identity): RequireAuth,
    Json(cart): Json<CandidateCart>,
) -> Result<Json<Reconciliation>> {
    let reconciliation = OrderService::new(state.pool()).reconcile_cart(&cart).await?;
    Ok(Json(reconciliation))
}
