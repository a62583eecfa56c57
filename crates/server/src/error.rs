//! Unified error handling.
//!
//! Provides a unified `AppError` covering the engine's failure taxonomy. All
//! route handlers return `Result<T, AppError>`; the `IntoResponse` impl maps
//! each variant to an HTTP status. Every variant is terminal for the current
//! request - the engine performs no internal retries (a `Conflict` is safe
//! for the caller to retry once after re-reading state).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use oakline_core::TransitionError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the order engine.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid bearer credential.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Valid identity, insufficient entitlement.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed input (empty cart, rating out of range, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Requested order-status change not reachable from the current state.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Concurrent mutation raced on the same order and lost.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Referenced order/product/review does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Underlying durable-store error.
    #[error("Storage error: {0}")]
    Storage(sqlx::Error),

    /// Anything else that should surface as a 500.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => Self::NotFound(what),
            RepositoryError::Conflict(what) => Self::Conflict(what),
            RepositoryError::Database(e) => Self::Storage(e),
            RepositoryError::DataCorruption(what) => Self::Internal(what),
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        Self::InvalidTransition(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                Self::Unauthenticated("invalid email or password".to_owned())
            }
            _ => Self::Unauthenticated(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request error");
        }

        // Don't expose storage details to clients
        let message = match &self {
            Self::Storage(_) | Self::Internal(_) => "Internal server error".to_owned(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order 123".to_owned());
        assert_eq!(err.to_string(), "Not found: order 123");

        let err = AppError::InvalidArgument("empty cart".to_owned());
        assert_eq!(err.to_string(), "Invalid argument: empty cart");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status_of(AppError::Unauthenticated("x".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Forbidden("x".to_owned())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::InvalidArgument("x".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::InvalidTransition("x".to_owned())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Conflict("x".to_owned())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::NotFound("x".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Internal("x".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_error_mapping() {
        let err: AppError = RepositoryError::NotFound("order 9".to_owned()).into();
        assert!(matches!(err, AppError::NotFound(_)));

        let err: AppError = RepositoryError::Conflict("version changed".to_owned()).into();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_transition_error_maps_to_unprocessable() {
        use oakline_core::OrderStatus;

        let err: AppError = TransitionError {
            from: OrderStatus::Pending,
            to: OrderStatus::Completed,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid transition: invalid order status transition: Pending -> Completed"
        );
        assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
