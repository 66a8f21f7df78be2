//! HTTP route handlers.

pub mod auth;
pub mod cart;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use axum::http::HeaderMap;
use checkout::{
    CartService, CheckoutError, Identity, InMemoryCatalog, InMemorySessions, OrderService,
};
use common::UserId;
use store::{CartStore, OrderStore};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<CS, OS>
where
    CS: CartStore + Clone,
    OS: OrderStore + Clone,
{
    pub cart_service: CartService<CS, InMemoryCatalog, InMemorySessions>,
    pub order_service: OrderService<OS, CS, InMemoryCatalog, InMemorySessions>,
    pub catalog: InMemoryCatalog,
    pub sessions: InMemorySessions,
}

/// Reads the caller's identity from the `X-User-Id` and `Authorization`
/// (bearer) headers. Missing or malformed headers count as unauthenticated;
/// there is no fallback user.
pub fn identity_from_headers(headers: &HeaderMap) -> Result<Identity, ApiError> {
    let user_id = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| uuid::Uuid::parse_str(value).ok())
        .map(UserId::from_uuid)
        .ok_or(ApiError::Checkout(CheckoutError::Unauthenticated))?;

    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Checkout(CheckoutError::Unauthenticated))?;

    Ok(Identity::new(user_id, token))
}
