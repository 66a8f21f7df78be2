use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use common::{CartLineId, OrderId, UserId};
use domain::{
    CartLineItem, CartLineUpdate, DeliveryOption, DomainError, Money, NewOrder, Order, OrderItem,
    OrderStatus, PaymentMethod, ProductId,
};

use crate::{
    OrderFilter, Result, StoreError,
    store::{CartStore, OrderStore},
};

/// PostgreSQL-backed cart and order store implementation.
///
/// Cart lines live in the `cart_lines` table, one row per (user, product).
/// Orders live in the `orders` table with their item snapshots as a JSONB
/// column; the order number comes from the table's id sequence.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_line(row: PgRow) -> Result<CartLineItem> {
        let quantity: i32 = row.try_get("quantity")?;
        let delivery_code: String = row.try_get("delivery_option")?;

        Ok(CartLineItem {
            id: CartLineId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            product_id: ProductId::from(row.try_get::<String, _>("product_id")?),
            quantity: quantity as u32,
            delivery_option: DeliveryOption::from_code(&delivery_code)?,
            added_at: row.try_get("added_at")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let payment_method: String = row.try_get("payment_method")?;
        let items_json: serde_json::Value = row.try_get("items")?;
        let items: Vec<OrderItem> = serde_json::from_value(items_json)?;

        Ok(Order::from_parts(
            OrderId::from_i64(row.try_get("id")?),
            UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            status.parse::<OrderStatus>()?,
            row.try_get("shipping_address")?,
            payment_method.parse::<PaymentMethod>()?,
            items,
            Money::from_cents(row.try_get("total_cents")?),
            row.try_get("ordered_at")?,
            row.try_get("delivered_at")?,
        ))
    }
}

#[async_trait]
impl CartStore for PostgresStore {
    async fn add_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        delivery_option: Option<DeliveryOption>,
    ) -> Result<CartLineItem> {
        let line = CartLineItem::new(
            user_id,
            product_id,
            quantity,
            delivery_option.unwrap_or_default(),
        )?;

        // Single upsert: concurrent adds of the same (user, product) merge
        // on the unique constraint instead of racing it. The stored row
        // keeps its id and added_at, and the delivery option only changes
        // when the add carried one ($7).
        let row = sqlx::query(
            r#"
            INSERT INTO cart_lines (id, user_id, product_id, quantity, delivery_option, added_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, product_id) DO UPDATE SET
                quantity = cart_lines.quantity + EXCLUDED.quantity,
                delivery_option = CASE WHEN $7 THEN EXCLUDED.delivery_option
                                       ELSE cart_lines.delivery_option END
            RETURNING id, user_id, product_id, quantity, delivery_option, added_at
            "#,
        )
        .bind(line.id.as_uuid())
        .bind(line.user_id.as_uuid())
        .bind(line.product_id.as_str())
        .bind(line.quantity as i32)
        .bind(line.delivery_option.code())
        .bind(line.added_at)
        .bind(delivery_option.is_some())
        .fetch_one(&self.pool)
        .await?;

        let line = Self::row_to_line(row)?;
        tracing::debug!(
            user_id = %line.user_id,
            product_id = %line.product_id,
            quantity = line.quantity,
            "cart line upserted"
        );
        Ok(line)
    }

    async fn update_line(
        &self,
        line_id: CartLineId,
        update: CartLineUpdate,
    ) -> Result<CartLineItem> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, user_id, product_id, quantity, delivery_option, added_at
            FROM cart_lines
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(line_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(StoreError::Domain(DomainError::LineNotFound { line_id }));
        };

        let mut line = Self::row_to_line(row)?;
        line.apply_update(&update)?;

        sqlx::query("UPDATE cart_lines SET quantity = $1, delivery_option = $2 WHERE id = $3")
            .bind(line.quantity as i32)
            .bind(line.delivery_option.code())
            .bind(line.id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(line)
    }

    async fn remove_line(&self, user_id: UserId, product_id: &ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = $1 AND product_id = $2")
            .bind(user_id.as_uuid())
            .bind(product_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn cart_lines(&self, user_id: UserId) -> Result<Vec<CartLineItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, product_id, quantity, delivery_option, added_at
            FROM cart_lines
            WHERE user_id = $1
            ORDER BY added_at ASC, id ASC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_line).collect()
    }

    async fn item_count(&self, user_id: UserId) -> Result<u32> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT SUM(quantity) FROM cart_lines WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        Ok(count.unwrap_or(0) as u32)
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn save_order(&self, new_order: NewOrder) -> Result<Order> {
        let items_json = serde_json::to_value(new_order.items())?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (user_id, status, shipping_address, payment_method, items, total_cents, ordered_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(new_order.user_id().as_uuid())
        .bind(OrderStatus::Pending.as_str())
        .bind(new_order.shipping_address())
        .bind(new_order.payment_method().as_str())
        .bind(items_json)
        .bind(new_order.total_amount().cents())
        .bind(new_order.ordered_at())
        .fetch_one(&self.pool)
        .await?;

        let order = new_order.into_order(OrderId::from_i64(id));
        tracing::debug!(
            order_id = %order.id(),
            user_id = %order.user_id(),
            total_cents = order.total_amount().cents(),
            "order saved"
        );
        Ok(order)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, user_id, status, shipping_address, payment_method, items, total_cents, ordered_at, delivered_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_order(row)?)),
            None => Ok(None),
        }
    }

    async fn find_orders(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let mut sql = String::from(
            "SELECT id, user_id, status, shipping_address, payment_method, items, total_cents, ordered_at, delivered_at FROM orders WHERE 1=1",
        );
        let mut param_count = 0;

        // Build dynamic query
        if filter.user_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND user_id = ${param_count}"));
        }
        if filter.status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }

        sql.push_str(" ORDER BY ordered_at DESC, id DESC");

        if filter.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if filter.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        // Build and execute query with parameters
        let mut sqlx_query = sqlx::query(&sql);

        if let Some(user_id) = filter.user_id {
            sqlx_query = sqlx_query.bind(user_id.as_uuid());
        }
        if let Some(status) = filter.status {
            sqlx_query = sqlx_query.bind(status.as_str());
        }
        if let Some(limit) = filter.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = filter.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order> {
        // Lock the row so the transition check and the write are one unit
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, user_id, status, shipping_address, payment_method, items, total_cents, ordered_at, delivered_at
            FROM orders
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(StoreError::OrderNotFound(order_id));
        };

        let mut order = Self::row_to_order(row)?;
        order.transition(status)?;

        sqlx::query("UPDATE orders SET status = $1, delivered_at = $2 WHERE id = $3")
            .bind(order.status().as_str())
            .bind(order.delivered_at())
            .bind(order.id().as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(order_id = %order.id(), status = %order.status(), "order status persisted");
        Ok(order)
    }
}
