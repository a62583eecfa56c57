//! Order lifecycle routes.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use oakline_core::{CandidateCart, CandidateLine, OrderId, OrderStatus, PaymentMethod, ProductId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderSummary};
use crate::services::{CheckoutReceipt, OrderService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub lines: Vec<CandidateLine>,
    pub payment_method: String,
}

/// `POST /api/checkout`
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutReceipt>> {
    let receipt = OrderService::new(state.pool())
        .checkout(
            identity,
            &CandidateCart::new(request.lines),
            PaymentMethod::new(request.payment_method),
        )
        .await?;
    Ok(Json(receipt))
}

#[derive(Debug, Deserialize)]
pub struct QuickOrderRequest {
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub payment_method: String,
}

const fn default_quantity() -> u32 {
    1
}

/// `POST /api/products/{id}/order`
pub async fn quick_order(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(product_id): Path<ProductId>,
    Json(request): Json<QuickOrderRequest>,
) -> Result<Json<CheckoutReceipt>> {
    let receipt = OrderService::new(state.pool())
        .quick_order(
            identity,
            product_id,
            request.quantity,
            PaymentMethod::new(request.payment_method),
        )
        .await?;
    Ok(Json(receipt))
}

/// `PUT /api/orders/{id}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.pool())
        .cancel(identity, order_id)
        .await?;
    Ok(Json(order))
}

/// `POST /api/orders/{id}/reorder`
pub async fn reorder(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<Json<CheckoutReceipt>> {
    let receipt = OrderService::new(state.pool())
        .reorder(identity, order_id)
        .await?;
    Ok(Json(receipt))
}

#[derive(Debug, Deserialize)]
pub struct AdvanceStatusRequest {
    pub status: OrderStatus,
}

/// `PUT /api/orders/{id}/status`
pub async fn advance_status(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(order_id): Path<OrderId>,
    Json(request): Json<AdvanceStatusRequest>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.pool())
        .advance_status(identity, order_id, request.status)
        .await?;
    Ok(Json(order))
}

/// `GET /api/profile/me/orders`
pub async fn list_mine(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Vec<OrderSummary>>> {
    let orders = OrderService::new(state.pool()).list_mine(identity).await?;
    Ok(Json(orders))
}

/// `GET /api/orders`
pub async fn list_all(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Vec<OrderSummary>>> {
    let orders = OrderService::new(state.pool()).list_all(identity).await?;
    Ok(Json(orders))
}
