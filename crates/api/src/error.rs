//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use domain::DomainError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout service error.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        CheckoutError::Unauthenticated => (StatusCode::UNAUTHORIZED, err.to_string()),
        CheckoutError::OrderNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        CheckoutError::CollaboratorUnavailable { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
        CheckoutError::Domain(domain_err) => match domain_err {
            DomainError::InvalidTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
            DomainError::LineNotFound { .. } | DomainError::ProductNotFound { .. } => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            DomainError::InvalidQuantity { .. }
            | DomainError::EmptyOrder
            | DomainError::InvalidAmount { .. }
            | DomainError::UnknownStatus { .. }
            | DomainError::UnknownDeliveryOption { .. }
            | DomainError::UnknownPaymentMethod { .. } => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
        },
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Checkout(CheckoutError::Domain(err))
    }
}
