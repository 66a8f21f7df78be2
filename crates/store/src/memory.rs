use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::{CartLineId, OrderId, UserId};
use domain::{
    CartLineItem, CartLineUpdate, DeliveryOption, DomainError, NewOrder, Order, OrderStatus,
    ProductId,
};

use crate::{
    OrderFilter, Result, StoreError,
    store::{CartStore, OrderStore},
};

/// In-memory cart store implementation for testing.
///
/// This implementation keeps all cart lines in memory and provides the same
/// interface as the PostgreSQL implementation. Reads and writes can be made
/// to fail on demand to exercise unavailability handling.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    lines: Arc<RwLock<Vec<CartLineItem>>>,
    fail_on_read: Arc<AtomicBool>,
    fail_on_write: Arc<AtomicBool>,
}

impl InMemoryCartStore {
    /// Creates a new empty in-memory cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of lines across all carts.
    pub async fn line_count(&self) -> usize {
        self.lines.read().await.len()
    }

    /// Clears every cart.
    pub async fn clear(&self) {
        self.lines.write().await.clear();
    }

    /// Makes subsequent reads fail with `Unavailable`.
    pub fn set_fail_on_read(&self, fail: bool) {
        self.fail_on_read.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent writes fail with `Unavailable`.
    pub fn set_fail_on_write(&self, fail: bool) {
        self.fail_on_write.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn add_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        delivery_option: Option<DeliveryOption>,
    ) -> Result<CartLineItem> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "cart store writes are disabled".to_string(),
            ));
        }

        let mut lines = self.lines.write().await;

        if let Some(line) = lines
            .iter_mut()
            .find(|l| l.user_id == user_id && l.product_id == product_id)
        {
            line.merge_add(quantity, delivery_option)?;
            return Ok(line.clone());
        }

        let line = CartLineItem::new(
            user_id,
            product_id,
            quantity,
            delivery_option.unwrap_or_default(),
        )?;
        lines.push(line.clone());
        Ok(line)
    }

    async fn update_line(
        &self,
        line_id: CartLineId,
        update: CartLineUpdate,
    ) -> Result<CartLineItem> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "cart store writes are disabled".to_string(),
            ));
        }

        let mut lines = self.lines.write().await;

        let Some(line) = lines.iter_mut().find(|l| l.id == line_id) else {
            return Err(StoreError::Domain(DomainError::LineNotFound { line_id }));
        };
        line.apply_update(&update)?;
        Ok(line.clone())
    }

    async fn remove_line(&self, user_id: UserId, product_id: &ProductId) -> Result<bool> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "cart store writes are disabled".to_string(),
            ));
        }

        let mut lines = self.lines.write().await;
        let before = lines.len();
        lines.retain(|l| !(l.user_id == user_id && &l.product_id == product_id));
        Ok(lines.len() < before)
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<u64> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "cart store writes are disabled".to_string(),
            ));
        }

        let mut lines = self.lines.write().await;
        let before = lines.len();
        lines.retain(|l| l.user_id != user_id);
        Ok((before - lines.len()) as u64)
    }

    async fn cart_lines(&self, user_id: UserId) -> Result<Vec<CartLineItem>> {
        if self.fail_on_read.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "cart store reads are disabled".to_string(),
            ));
        }

        let lines = self.lines.read().await;
        Ok(lines
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn item_count(&self, user_id: UserId) -> Result<u32> {
        if self.fail_on_read.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "cart store reads are disabled".to_string(),
            ));
        }

        let lines = self.lines.read().await;
        Ok(lines
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| l.quantity)
            .sum())
    }
}

/// In-memory order store implementation for testing.
///
/// Order numbers are assigned sequentially starting at 1, matching the
/// PostgreSQL implementation's sequence column.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<Vec<Order>>>,
    next_id: Arc<AtomicI64>,
    fail_on_write: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Clears all orders. Assigned order numbers are not reused.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }

    /// Makes subsequent writes fail with `Unavailable`.
    pub fn set_fail_on_write(&self, fail: bool) {
        self.fail_on_write.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn save_order(&self, new_order: NewOrder) -> Result<Order> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "order store writes are disabled".to_string(),
            ));
        }

        let id = OrderId::from_i64(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let order = new_order.into_order(id);
        self.orders.write().await.push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.id() == order_id).cloned())
    }

    async fn find_orders(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matched: Vec<_> = orders
            .iter()
            .filter(|o| {
                if let Some(user_id) = filter.user_id
                    && o.user_id() != user_id
                {
                    return false;
                }
                if let Some(status) = filter.status
                    && o.status() != status
                {
                    return false;
                }
                true
            })
            .cloned()
            .collect();

        // Newest first
        matched.sort_by(|a, b| {
            b.ordered_at()
                .cmp(&a.ordered_at())
                .then(b.id().cmp(&a.id()))
        });

        // Apply offset and limit
        let offset = filter.offset.unwrap_or(0);
        let matched: Vec<_> = matched.into_iter().skip(offset).collect();

        let matched = if let Some(limit) = filter.limit {
            matched.into_iter().take(limit).collect()
        } else {
            matched
        };

        Ok(matched)
    }

    async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "order store writes are disabled".to_string(),
            ));
        }

        let mut orders = self.orders.write().await;

        let Some(order) = orders.iter_mut().find(|o| o.id() == order_id) else {
            return Err(StoreError::OrderNotFound(order_id));
        };
        order.transition(status)?;
        Ok(order.clone())
    }
}
