//! Order placement, lifecycle, and query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use common::OrderId;
use domain::{Order, OrderStatus, PaymentMethod};
use serde::{Deserialize, Serialize};
use store::{CartStore, OrderStore};

use super::{AppState, identity_from_headers};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address: String,
    pub payment_method: String,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusQuery {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub delivery_option: String,
    pub price_at_time_cents: i64,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: String,
    pub status: String,
    pub shipping_address: String,
    pub payment_method: String,
    pub items: Vec<OrderItemResponse>,
    pub total_cents: i64,
    pub total_display: String,
    pub ordered_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<String>,
}

// -- Handlers --

/// POST /orders — check out the stored cart into an order.
#[tracing::instrument(skip(state, headers, req))]
pub async fn checkout<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    headers: HeaderMap,
    Json(req): Json<CheckoutRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError> {
    let identity = identity_from_headers(&headers)?;
    let payment_method = req.payment_method.parse::<PaymentMethod>()?;

    let order = state
        .order_service
        .checkout(&identity, &req.shipping_address, payment_method)
        .await?;

    Ok((axum::http::StatusCode::CREATED, Json(to_response(&order)?)))
}

/// GET /orders — the caller's orders, newest first, optionally filtered
/// by ?status=.
#[tracing::instrument(skip(state, headers))]
pub async fn list<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    headers: HeaderMap,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let identity = identity_from_headers(&headers)?;
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()?;

    let orders = state.order_service.list_orders(&identity, status).await?;
    to_responses(&orders)
}

/// GET /orders/:id — load a single order.
#[tracing::instrument(skip(state, headers))]
pub async fn get<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    let identity = identity_from_headers(&headers)?;
    let order = state
        .order_service
        .get_order(&identity, OrderId::from_i64(id))
        .await?;
    Ok(Json(to_response(&order)?))
}

/// GET /orders/status/:status — all orders in a status across users,
/// newest first. This is the fulfilment view.
#[tracing::instrument(skip(state, headers))]
pub async fn by_status<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Path(status): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let identity = identity_from_headers(&headers)?;
    let status = status.parse::<OrderStatus>()?;

    let orders = state
        .order_service
        .orders_by_status(&identity, status)
        .await?;
    to_responses(&orders)
}

/// PUT /orders/:id/cancel — cancel a pending order.
#[tracing::instrument(skip(state, headers))]
pub async fn cancel<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    let identity = identity_from_headers(&headers)?;
    let order = state
        .order_service
        .cancel_order(&identity, OrderId::from_i64(id))
        .await?;
    Ok(Json(to_response(&order)?))
}

/// PUT /orders/:id/status?status= — move an order along its lifecycle.
/// Transitions outside the state machine are refused with 409.
#[tracing::instrument(skip(state, headers))]
pub async fn update_status<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Query(query): Query<UpdateStatusQuery>,
) -> Result<Json<OrderResponse>, ApiError> {
    let identity = identity_from_headers(&headers)?;
    let status = query.status.parse::<OrderStatus>()?;

    let order = state
        .order_service
        .update_status(&identity, OrderId::from_i64(id), status)
        .await?;
    Ok(Json(to_response(&order)?))
}

fn to_response(order: &Order) -> Result<OrderResponse, ApiError> {
    let total = order.total_amount();
    let total_display = total
        .display_string()
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let items: Vec<OrderItemResponse> = order
        .items()
        .iter()
        .map(|item| OrderItemResponse {
            product_id: item.product_id.as_str().to_string(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            delivery_option: item.delivery_option.code().to_string(),
            price_at_time_cents: item.price_at_time.cents(),
            total_cents: item.total_price().cents(),
        })
        .collect();

    Ok(OrderResponse {
        id: order.id().as_i64(),
        user_id: order.user_id().to_string(),
        status: order.status().as_str().to_string(),
        shipping_address: order.shipping_address().to_string(),
        payment_method: order.payment_method().as_str().to_string(),
        items,
        total_cents: total.cents(),
        total_display,
        ordered_at: order.ordered_at().to_rfc3339(),
        delivered_at: order.delivered_at().map(|at| at.to_rfc3339()),
    })
}

fn to_responses(orders: &[Order]) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let responses = orders
        .iter()
        .map(to_response)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(responses))
}
