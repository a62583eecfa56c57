//! Authentication extractor.
//!
//! Resolves the `Authorization: Bearer` credential to a caller [`Identity`]
//! before any engine operation runs. Verification is stateless (signature +
//! expiry); the subject is then re-resolved against the account store so a
//! token for a deleted customer is rejected, and the role comes from the
//! store rather than the token.

use axum::{extract::FromRequestParts, http::request::Parts};

use oakline_core::Identity;

use crate::db::CustomerRepository;
use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Extractor that requires a verified caller identity.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(identity): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("hello, customer {}", identity.id)
/// }
/// ```
pub struct RequireAuth(pub Identity);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingCredential)?;

        let claims = state.guard().verify(token)?;

        let customer = CustomerRepository::new(state.pool())
            .get_by_id(claims.sub)
            .await?
            .ok_or(AuthError::UnknownIdentity)?;

        Ok(Self(Identity::new(customer.id, customer.role)))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
