//! Product catalog endpoints.
//!
//! Catalog reads are public; they carry no identity and never touch the
//! credential store.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use checkout::{Catalog, Product, ProductUpdate, Rating};
use domain::{Money, ProductId};
use serde::{Deserialize, Serialize};
use store::{CartStore, OrderStore};

use super::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub id: Option<String>,
    pub name: String,
    pub image: String,
    pub rating: Rating,
    pub price_cents: i64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(rename = "type", default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub size_chart_link: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub rating: Option<Rating>,
    pub price_cents: Option<i64>,
    pub keywords: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub size_chart_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
}

#[derive(Debug, Deserialize)]
pub struct PriceRangeQuery {
    pub min_cents: i64,
    pub max_cents: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub image: String,
    pub rating: Rating,
    pub price_cents: i64,
    pub price_display: String,
    pub keywords: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_chart_link: Option<String>,
}

#[derive(Serialize)]
pub struct DeletedProductResponse {
    pub removed: bool,
}

// -- Handlers --

/// GET /products — list the full catalog.
#[tracing::instrument(skip(state))]
pub async fn list<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.list_products().await?;
    to_responses(products)
}

/// GET /products/:id — load a single product.
#[tracing::instrument(skip(state))]
pub async fn get<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.catalog.get_product(&ProductId::new(id)).await?;
    Ok(Json(to_response(product)?))
}

/// GET /products/search?keyword= — match against names and keywords.
#[tracing::instrument(skip(state))]
pub async fn search<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.search_products(&query.keyword).await?;
    to_responses(products)
}

/// GET /products/type/:type — filter by category tag.
#[tracing::instrument(skip(state))]
pub async fn by_type<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Path(product_type): Path<String>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.products_by_type(&product_type).await?;
    to_responses(products)
}

/// GET /products/rating/:min_stars — filter by minimum rating.
#[tracing::instrument(skip(state))]
pub async fn by_min_rating<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Path(min_stars): Path<f32>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.products_by_min_rating(min_stars).await?;
    to_responses(products)
}

/// GET /products/price-range?min_cents=&max_cents= — inclusive price filter.
#[tracing::instrument(skip(state))]
pub async fn by_price_range<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Query(query): Query<PriceRangeQuery>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state
        .catalog
        .products_in_price_range(
            Money::from_cents(query.min_cents),
            Money::from_cents(query.max_cents),
        )
        .await?;
    to_responses(products)
}

/// POST /products — add a product to the catalog.
#[tracing::instrument(skip(state, req))]
pub async fn create<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(axum::http::StatusCode, Json<ProductResponse>), ApiError> {
    let id = req
        .id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let product = Product {
        id: ProductId::new(id),
        name: req.name,
        image: req.image,
        rating: req.rating,
        price: Money::from_cents(req.price_cents),
        keywords: req.keywords,
        product_type: req.product_type,
        size_chart_link: req.size_chart_link,
    };

    let created = state.catalog.create_product(product).await?;
    Ok((axum::http::StatusCode::CREATED, Json(to_response(created)?)))
}

/// PUT /products/:id — apply a partial update; absent fields keep their value.
#[tracing::instrument(skip(state, req))]
pub async fn update<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let update = ProductUpdate {
        name: req.name,
        image: req.image,
        rating: req.rating,
        price: req.price_cents.map(Money::from_cents),
        keywords: req.keywords,
        product_type: req.product_type,
        size_chart_link: req.size_chart_link,
    };

    let updated = state
        .catalog
        .update_product(&ProductId::new(id), update)
        .await?;
    Ok(Json(to_response(updated)?))
}

/// DELETE /products/:id — remove a product; removing an absent one is a no-op.
#[tracing::instrument(skip(state))]
pub async fn delete<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<CS, OS>>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedProductResponse>, ApiError> {
    let removed = state.catalog.delete_product(&ProductId::new(id)).await?;
    Ok(Json(DeletedProductResponse { removed }))
}

pub(super) fn to_response(product: Product) -> Result<ProductResponse, ApiError> {
    let price_display = product
        .price
        .display_string()
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(ProductResponse {
        id: product.id.as_str().to_string(),
        name: product.name,
        image: product.image,
        rating: product.rating,
        price_cents: product.price.cents(),
        price_display,
        keywords: product.keywords,
        product_type: product.product_type,
        size_chart_link: product.size_chart_link,
    })
}

fn to_responses(products: Vec<Product>) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let responses = products
        .into_iter()
        .map(to_response)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(responses))
}
