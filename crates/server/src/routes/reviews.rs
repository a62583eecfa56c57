//! Review routes.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use oakline_core::ProductId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Review, SubmitOutcome};
use crate::services::ReviewService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub product_id: ProductId,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    pub review: Review,
    pub outcome: SubmitOutcome,
}

/// `POST /api/reviews`
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<Json<SubmitReviewResponse>> {
    let (review, outcome) = ReviewService::new(state.pool())
        .submit(identity, request.product_id, request.rating, &request.comment)
        .await?;
    Ok(Json(SubmitReviewResponse { review, outcome }))
}

/// `GET /api/products/{id}/reviews`
///
/// Intentionally unauthenticated: public review display.
pub async fn list_for_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewService::new(state.pool())
        .list_for_product(product_id)
        .await?;
    Ok(Json(reviews))
}
