//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency. Each test
//! gets a fresh pool and truncated tables, and the tests run serially.

use std::sync::Arc;

use common::{CartLineId, OrderId, UserId};
use domain::{
    CartLineUpdate, DeliveryOption, DomainError, Money, NewOrder, OrderItem, OrderStatus,
    PaymentMethod, ProductId,
};
use serial_test::serial;
use sqlx::PgPool;
use store::{CartStore, OrderFilter, OrderStore, OrderStoreExt, PostgresStore, StoreError};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            // Run migrations using raw_sql to execute multiple statements
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_storefront_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    // Create a fresh pool for each test to avoid connection issues
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables and reset the order number sequence for test isolation
    sqlx::query("TRUNCATE TABLE cart_lines, orders RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn create_new_order(user_id: UserId) -> NewOrder {
    NewOrder::from_items(
        user_id,
        "123 Main St",
        PaymentMethod::CreditCard,
        vec![
            OrderItem::new(
                "prod-1",
                "Socks",
                2,
                DeliveryOption::Free,
                Money::from_cents(1090),
            ),
            OrderItem::new(
                "prod-2",
                "Basketball",
                1,
                DeliveryOption::Fast,
                Money::from_cents(2095),
            ),
        ],
    )
    .unwrap()
}

#[tokio::test]
#[serial]
async fn add_and_retrieve_cart_lines() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    store
        .add_line(user_id, ProductId::from("prod-1"), 2, None)
        .await
        .unwrap();
    store
        .add_line(
            user_id,
            ProductId::from("prod-2"),
            1,
            Some(DeliveryOption::Fast),
        )
        .await
        .unwrap();

    let lines = store.cart_lines(user_id).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].product_id, ProductId::from("prod-1"));
    assert_eq!(lines[0].quantity, 2);
    assert_eq!(lines[0].delivery_option, DeliveryOption::Free);
    assert_eq!(lines[1].product_id, ProductId::from("prod-2"));
    assert_eq!(lines[1].delivery_option, DeliveryOption::Fast);
}

#[tokio::test]
#[serial]
async fn add_same_product_merges_into_one_row() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    let first = store
        .add_line(user_id, ProductId::from("prod-1"), 2, None)
        .await
        .unwrap();
    let merged = store
        .add_line(user_id, ProductId::from("prod-1"), 3, None)
        .await
        .unwrap();

    assert_eq!(merged.id, first.id);
    assert_eq!(merged.quantity, 5);

    let lines = store.cart_lines(user_id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 5);
}

#[tokio::test]
#[serial]
async fn concurrent_first_adds_merge_instead_of_failing() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    // Neither add sees an existing row; the upsert must fold them into one.
    let (a, b) = tokio::join!(
        store.add_line(user_id, ProductId::from("prod-1"), 2, None),
        store.add_line(user_id, ProductId::from("prod-1"), 3, None),
    );
    a.unwrap();
    b.unwrap();

    let lines = store.cart_lines(user_id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 5);
}

#[tokio::test]
#[serial]
async fn merge_replaces_delivery_option_only_when_supplied() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    store
        .add_line(
            user_id,
            ProductId::from("prod-1"),
            1,
            Some(DeliveryOption::Fast),
        )
        .await
        .unwrap();

    let merged = store
        .add_line(user_id, ProductId::from("prod-1"), 1, None)
        .await
        .unwrap();
    assert_eq!(merged.delivery_option, DeliveryOption::Fast);

    let merged = store
        .add_line(
            user_id,
            ProductId::from("prod-1"),
            1,
            Some(DeliveryOption::SameDay),
        )
        .await
        .unwrap();
    assert_eq!(merged.delivery_option, DeliveryOption::SameDay);
}

#[tokio::test]
#[serial]
async fn add_rejects_zero_quantity() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    let result = store
        .add_line(user_id, ProductId::from("prod-1"), 0, None)
        .await;

    assert!(matches!(
        result,
        Err(StoreError::Domain(DomainError::InvalidQuantity { .. }))
    ));
    assert!(store.cart_lines(user_id).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn update_line_persists_changes() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    let line = store
        .add_line(user_id, ProductId::from("prod-1"), 2, None)
        .await
        .unwrap();

    store
        .update_line(
            line.id,
            CartLineUpdate::new()
                .with_quantity(7)
                .with_delivery_option(DeliveryOption::SameDay),
        )
        .await
        .unwrap();

    let lines = store.cart_lines(user_id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 7);
    assert_eq!(lines[0].delivery_option, DeliveryOption::SameDay);
}

#[tokio::test]
#[serial]
async fn cart_writes_are_last_write_wins() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    let line = store
        .add_line(user_id, ProductId::from("prod-1"), 2, None)
        .await
        .unwrap();

    // Two clients write the same line in turn: the later write stands and
    // the earlier one is overwritten without a version check
    store
        .update_line(line.id, CartLineUpdate::new().with_quantity(5))
        .await
        .unwrap();
    let last = store
        .update_line(line.id, CartLineUpdate::new().with_quantity(2))
        .await
        .unwrap();

    assert_eq!(last.quantity, 2);
    let lines = store.cart_lines(user_id).await.unwrap();
    assert_eq!(lines[0].quantity, 2);
}

#[tokio::test]
#[serial]
async fn update_missing_line_fails() {
    let store = get_test_store().await;

    let result = store
        .update_line(CartLineId::new(), CartLineUpdate::new().with_quantity(2))
        .await;

    assert!(matches!(
        result,
        Err(StoreError::Domain(DomainError::LineNotFound { .. }))
    ));
}

#[tokio::test]
#[serial]
async fn remove_line_reports_whether_it_existed() {
    let store = get_test_store().await;
    let user_id = UserId::new();
    let product_id = ProductId::from("prod-1");

    store
        .add_line(user_id, product_id.clone(), 1, None)
        .await
        .unwrap();

    assert!(store.remove_line(user_id, &product_id).await.unwrap());
    assert!(!store.remove_line(user_id, &product_id).await.unwrap());
}

#[tokio::test]
#[serial]
async fn clear_cart_only_affects_one_user() {
    let store = get_test_store().await;
    let user1 = UserId::new();
    let user2 = UserId::new();

    store
        .add_line(user1, ProductId::from("prod-1"), 1, None)
        .await
        .unwrap();
    store
        .add_line(user1, ProductId::from("prod-2"), 1, None)
        .await
        .unwrap();
    store
        .add_line(user2, ProductId::from("prod-1"), 1, None)
        .await
        .unwrap();

    let removed = store.clear_cart(user1).await.unwrap();
    assert_eq!(removed, 2);

    assert!(store.cart_lines(user1).await.unwrap().is_empty());
    assert_eq!(store.cart_lines(user2).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn item_count_sums_quantities() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    assert_eq!(store.item_count(user_id).await.unwrap(), 0);

    store
        .add_line(user_id, ProductId::from("prod-1"), 2, None)
        .await
        .unwrap();
    store
        .add_line(user_id, ProductId::from("prod-2"), 3, None)
        .await
        .unwrap();

    assert_eq!(store.item_count(user_id).await.unwrap(), 5);
}

#[tokio::test]
#[serial]
async fn save_order_assigns_sequential_numbers() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    let first = store.save_order(create_new_order(user_id)).await.unwrap();
    let second = store.save_order(create_new_order(user_id)).await.unwrap();
    let third = store.save_order(create_new_order(user_id)).await.unwrap();

    assert_eq!(first.id(), OrderId::from_i64(1));
    assert_eq!(second.id(), OrderId::from_i64(2));
    assert_eq!(third.id(), OrderId::from_i64(3));
}

#[tokio::test]
#[serial]
async fn save_and_load_order_roundtrip() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    let saved = store.save_order(create_new_order(user_id)).await.unwrap();

    let loaded = store.get_order(saved.id()).await.unwrap().unwrap();
    assert_eq!(loaded.id(), saved.id());
    assert_eq!(loaded.user_id(), user_id);
    assert_eq!(loaded.status(), OrderStatus::Pending);
    assert_eq!(loaded.shipping_address(), "123 Main St");
    assert_eq!(loaded.payment_method(), PaymentMethod::CreditCard);
    assert_eq!(loaded.total_amount(), Money::from_cents(2 * 1090 + 2095));
    assert!(loaded.delivered_at().is_none());

    // Item snapshots survive the JSONB roundtrip
    assert_eq!(loaded.items().len(), 2);
    assert_eq!(loaded.items()[0].product_name, "Socks");
    assert_eq!(loaded.items()[0].price_at_time, Money::from_cents(1090));
    assert_eq!(loaded.items()[1].delivery_option, DeliveryOption::Fast);
}

#[tokio::test]
#[serial]
async fn get_missing_order_returns_none() {
    let store = get_test_store().await;

    let result = store.get_order(OrderId::from_i64(42)).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
#[serial]
async fn find_orders_returns_newest_first() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    for _ in 0..3 {
        store.save_order(create_new_order(user_id)).await.unwrap();
    }

    let orders = store
        .find_orders(OrderFilter::for_user(user_id))
        .await
        .unwrap();

    assert_eq!(orders.len(), 3);
    assert_eq!(orders[0].id(), OrderId::from_i64(3));
    assert_eq!(orders[1].id(), OrderId::from_i64(2));
    assert_eq!(orders[2].id(), OrderId::from_i64(1));
}

#[tokio::test]
#[serial]
async fn find_orders_filters_by_user_and_status() {
    let store = get_test_store().await;
    let user1 = UserId::new();
    let user2 = UserId::new();

    let order = store.save_order(create_new_order(user1)).await.unwrap();
    store.save_order(create_new_order(user1)).await.unwrap();
    store.save_order(create_new_order(user2)).await.unwrap();

    store
        .update_status(order.id(), OrderStatus::Confirmed)
        .await
        .unwrap();

    let confirmed = store
        .find_orders(OrderFilter::for_user(user1).status(OrderStatus::Confirmed))
        .await
        .unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id(), order.id());

    let pending = store
        .find_orders(OrderFilter::new().status(OrderStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);
}

#[tokio::test]
#[serial]
async fn find_orders_with_limit_and_offset() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    for _ in 0..5 {
        store.save_order(create_new_order(user_id)).await.unwrap();
    }

    let page = store
        .find_orders(OrderFilter::for_user(user_id).limit(2).offset(1))
        .await
        .unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id(), OrderId::from_i64(4));
    assert_eq!(page[1].id(), OrderId::from_i64(3));
}

#[tokio::test]
#[serial]
async fn update_status_walks_the_lifecycle() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    let order = store.save_order(create_new_order(user_id)).await.unwrap();

    store
        .update_status(order.id(), OrderStatus::Confirmed)
        .await
        .unwrap();
    store
        .update_status(order.id(), OrderStatus::Shipped)
        .await
        .unwrap();
    let delivered = store
        .update_status(order.id(), OrderStatus::Delivered)
        .await
        .unwrap();

    assert_eq!(delivered.status(), OrderStatus::Delivered);
    assert!(delivered.delivered_at().is_some());

    // Status and delivery time are persisted
    let loaded = store.get_order(order.id()).await.unwrap().unwrap();
    assert_eq!(loaded.status(), OrderStatus::Delivered);
    assert!(loaded.delivered_at().is_some());
}

#[tokio::test]
#[serial]
async fn update_status_rejects_invalid_transition() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    let order = store.save_order(create_new_order(user_id)).await.unwrap();

    let result = store
        .update_status(order.id(), OrderStatus::Delivered)
        .await;
    assert!(matches!(
        result,
        Err(StoreError::Domain(DomainError::InvalidTransition { .. }))
    ));

    // Row untouched after the failed transition
    let loaded = store.get_order(order.id()).await.unwrap().unwrap();
    assert_eq!(loaded.status(), OrderStatus::Pending);
}

#[tokio::test]
#[serial]
async fn update_status_on_missing_order_fails() {
    let store = get_test_store().await;

    let result = store
        .update_status(OrderId::from_i64(42), OrderStatus::Confirmed)
        .await;

    assert!(matches!(result, Err(StoreError::OrderNotFound(_))));
}

#[tokio::test]
#[serial]
async fn cancel_order_extension() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    let order = store.save_order(create_new_order(user_id)).await.unwrap();
    assert!(store.order_exists(order.id()).await.unwrap());

    let cancelled = store.cancel_order(order.id()).await.unwrap();
    assert_eq!(cancelled.status(), OrderStatus::Cancelled);

    // Terminal: a second cancel is not allowed
    let result = store.cancel_order(order.id()).await;
    assert!(matches!(
        result,
        Err(StoreError::Domain(DomainError::InvalidTransition { .. }))
    ));
}
