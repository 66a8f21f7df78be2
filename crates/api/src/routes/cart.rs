//! Shopping cart endpoints.
//!
//! Every route reads the caller's identity from the request headers and
//! fails closed with 401 when it cannot be verified. The count and total
//! badge reads degrade to zero inside the service when a collaborator is
//! down; everything else surfaces 503.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use checkout::CartEntry;
use common::CartLineId;
use domain::{CartLineItem, CartLineUpdate, DeliveryOption, ProductId};
use serde::{Deserialize, Serialize};
use store::{CartStore, OrderStore};

use super::products::ProductResponse;
use super::{AppState, identity_from_headers};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: Option<u32>,
    pub delivery_option: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdateCartLineRequest {
    pub quantity: Option<u32>,
    pub delivery_option: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartLineResponse {
    pub id: String,
    pub product_id: String,
    pub quantity: u32,
    pub delivery_option: String,
    pub added_at: String,
}

#[derive(Serialize)]
pub struct CartEntryResponse {
    pub line: CartLineResponse,
    pub product: ProductResponse,
    pub line_total_cents: i64,
}

#[derive(Serialize)]
pub struct CartCountResponse {
    pub count: u32,
}

#[derive(Serialize)]
pub struct CartTotalResponse {
    pub total_cents: i64,
    pub total_display: String,
}

#[derive(Serialize)]
pub struct RemovedLineResponse {
    pub removed: bool,
}

#[derive(Serialize)]
pub struct ClearedCartResponse {
    pub removed_lines: u64,
}

// -- Handlers --

/// POST /cart/add — add a product to the cart, merging into an existing
/// line for the same product.
#[tracing::instrument(skip(state, headers, req))]
pub async fn add<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    headers: HeaderMap,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<CartLineResponse>, ApiError> {
    let identity = identity_from_headers(&headers)?;
    let delivery_option = req
        .delivery_option
        .as_deref()
        .map(DeliveryOption::from_code)
        .transpose()?;

    let line = state
        .cart_service
        .add_item(
            &identity,
            ProductId::new(req.product_id),
            req.quantity.unwrap_or(1),
            delivery_option,
        )
        .await?;

    Ok(Json(line_response(&line)))
}

/// PUT /cart/items/:id — change quantity or delivery option on a line.
#[tracing::instrument(skip(state, headers, req))]
pub async fn update_line<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdateCartLineRequest>,
) -> Result<Json<CartLineResponse>, ApiError> {
    let identity = identity_from_headers(&headers)?;
    let line_id = parse_line_id(&id)?;

    let mut update = CartLineUpdate::new();
    if let Some(quantity) = req.quantity {
        update = update.with_quantity(quantity);
    }
    if let Some(code) = req.delivery_option.as_deref() {
        update = update.with_delivery_option(DeliveryOption::from_code(code)?);
    }

    let line = state
        .cart_service
        .update_item(&identity, line_id, update)
        .await?;
    Ok(Json(line_response(&line)))
}

/// DELETE /cart/items/:id — remove a product's line from the cart. The
/// path segment is the product ID; removing an absent product is a no-op.
#[tracing::instrument(skip(state, headers))]
pub async fn remove_line<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<RemovedLineResponse>, ApiError> {
    let identity = identity_from_headers(&headers)?;
    let removed = state
        .cart_service
        .remove_item(&identity, &ProductId::new(id))
        .await?;
    Ok(Json(RemovedLineResponse { removed }))
}

/// DELETE /cart — empty the cart.
#[tracing::instrument(skip(state, headers))]
pub async fn clear<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    headers: HeaderMap,
) -> Result<Json<ClearedCartResponse>, ApiError> {
    let identity = identity_from_headers(&headers)?;
    let removed_lines = state.cart_service.clear(&identity).await?;
    Ok(Json(ClearedCartResponse { removed_lines }))
}

/// GET /cart — the full cart with product details and live line totals.
#[tracing::instrument(skip(state, headers))]
pub async fn get<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<CartEntryResponse>>, ApiError> {
    let identity = identity_from_headers(&headers)?;
    let entries = state.cart_service.get_cart(&identity).await?;
    let responses = entries
        .into_iter()
        .map(entry_response)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(responses))
}

/// GET /cart/count — total quantity across lines, for the header badge.
#[tracing::instrument(skip(state, headers))]
pub async fn count<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    headers: HeaderMap,
) -> Result<Json<CartCountResponse>, ApiError> {
    let identity = identity_from_headers(&headers)?;
    let count = state.cart_service.item_count(&identity).await?;
    Ok(Json(CartCountResponse { count }))
}

/// GET /cart/total — live cart total at current catalog prices.
#[tracing::instrument(skip(state, headers))]
pub async fn total<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    headers: HeaderMap,
) -> Result<Json<CartTotalResponse>, ApiError> {
    let identity = identity_from_headers(&headers)?;
    let total = state.cart_service.cart_total(&identity).await?;
    let total_display = total
        .display_string()
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(Json(CartTotalResponse {
        total_cents: total.cents(),
        total_display,
    }))
}

fn line_response(line: &CartLineItem) -> CartLineResponse {
    CartLineResponse {
        id: line.id.to_string(),
        product_id: line.product_id.as_str().to_string(),
        quantity: line.quantity,
        delivery_option: line.delivery_option.code().to_string(),
        added_at: line.added_at.to_rfc3339(),
    }
}

fn entry_response(entry: CartEntry) -> Result<CartEntryResponse, ApiError> {
    let line_total_cents = entry.line_total().cents();
    let line = line_response(&entry.line);
    Ok(CartEntryResponse {
        line,
        product: super::products::to_response(entry.product)?,
        line_total_cents,
    })
}

fn parse_line_id(id: &str) -> Result<CartLineId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid cart line ID: {e}")))?;
    Ok(CartLineId::from_uuid(uuid))
}
