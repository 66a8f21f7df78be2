//! HTTP API server with observability for the storefront checkout system.
//!
//! Provides REST endpoints for the product catalog, the shopping cart, and
//! order placement and fulfilment, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use checkout::{CartService, InMemoryCatalog, InMemorySessions, OrderService};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{CartStore, InMemoryCartStore, InMemoryOrderStore, OrderStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<CS: CartStore + Clone + 'static, OS: OrderStore + Clone + 'static>(
    state: Arc<AppState<CS, OS>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/products", get(routes::products::list::<CS, OS>))
        .route("/products", post(routes::products::create::<CS, OS>))
        .route("/products/search", get(routes::products::search::<CS, OS>))
        .route("/products/type/{type}", get(routes::products::by_type::<CS, OS>))
        .route(
            "/products/rating/{min_stars}",
            get(routes::products::by_min_rating::<CS, OS>),
        )
        .route(
            "/products/price-range",
            get(routes::products::by_price_range::<CS, OS>),
        )
        .route("/products/{id}", get(routes::products::get::<CS, OS>))
        .route("/products/{id}", put(routes::products::update::<CS, OS>))
        .route("/products/{id}", delete(routes::products::delete::<CS, OS>))
        .route("/cart", get(routes::cart::get::<CS, OS>))
        .route("/cart", delete(routes::cart::clear::<CS, OS>))
        .route("/cart/add", post(routes::cart::add::<CS, OS>))
        .route("/cart/items/{id}", put(routes::cart::update_line::<CS, OS>))
        .route("/cart/items/{id}", delete(routes::cart::remove_line::<CS, OS>))
        .route("/cart/count", get(routes::cart::count::<CS, OS>))
        .route("/cart/total", get(routes::cart::total::<CS, OS>))
        .route("/orders", post(routes::orders::checkout::<CS, OS>))
        .route("/orders", get(routes::orders::list::<CS, OS>))
        .route("/orders/status/{status}", get(routes::orders::by_status::<CS, OS>))
        .route("/orders/{id}", get(routes::orders::get::<CS, OS>))
        .route("/orders/{id}/cancel", put(routes::orders::cancel::<CS, OS>))
        .route(
            "/orders/{id}/status",
            put(routes::orders::update_status::<CS, OS>),
        )
        .route("/auth/logout", post(routes::auth::logout::<CS, OS>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state backed by the in-memory stores, with the demo
/// catalog seeded and an empty session table.
pub fn create_default_state() -> Arc<AppState<InMemoryCartStore, InMemoryOrderStore>> {
    let cart_store = InMemoryCartStore::new();
    let order_store = InMemoryOrderStore::new();
    let catalog = InMemoryCatalog::with_demo_products();
    let sessions = InMemorySessions::new();

    let cart_service = CartService::new(cart_store.clone(), catalog.clone(), sessions.clone());
    let order_service = OrderService::new(
        order_store,
        cart_store,
        catalog.clone(),
        sessions.clone(),
    );

    Arc::new(AppState {
        cart_service,
        order_service,
        catalog,
        sessions,
    })
}
