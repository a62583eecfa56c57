//! Login route.
//!
//! The engine does not own registration or password management; it only
//! turns a valid email/password pair into the signed bearer token the rest
//! of the API consumes.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use oakline_core::{CustomerId, Role};

use crate::db::CustomerRepository;
use crate::error::Result;
use crate::services::auth::{self, AuthError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (customer, password_hash) = CustomerRepository::new(state.pool())
        .get_with_password_hash(&request.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !auth::verify_password(&request.password, &password_hash) {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.guard().issue(customer.id, customer.role)?;
    tracing::info!(customer = %customer.id, "login successful");

    Ok(Json(LoginResponse {
        token,
        user: LoginUser {
            id: customer.id,
            name: customer.name,
            email: customer.email,
            role: customer.role,
        },
    }))
}
