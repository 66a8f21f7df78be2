//! Session endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use checkout::CredentialStore;
use store::{CartStore, OrderStore};

use super::{AppState, identity_from_headers};
use crate::error::ApiError;

/// POST /auth/logout — end the caller's server-side session. Logging out
/// with a token that is already invalid succeeds.
#[tracing::instrument(skip(state, headers))]
pub async fn logout<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let identity = identity_from_headers(&headers)?;
    state.sessions.clear_session(&identity).await?;
    Ok(StatusCode::NO_CONTENT)
}
