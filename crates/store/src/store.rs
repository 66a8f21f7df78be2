use async_trait::async_trait;
use common::{CartLineId, OrderId, UserId};
use domain::{
    CartLineItem, CartLineUpdate, DeliveryOption, NewOrder, Order, OrderStatus, ProductId,
};

use crate::{OrderFilter, Result};

/// Persistence for cart lines.
///
/// A cart holds at most one line per (user, product) pair; adding a product
/// that is already present merges into the existing line. All implementations
/// must be thread-safe (Send + Sync).
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Adds a product to the user's cart.
    ///
    /// If the user already has a line for this product, the quantity is added
    /// to it and the delivery option is replaced only when one is supplied.
    /// Otherwise a new line is created, defaulting to free delivery.
    ///
    /// Returns the resulting line.
    async fn add_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        delivery_option: Option<DeliveryOption>,
    ) -> Result<CartLineItem>;

    /// Applies a partial update to a line. Absent fields keep their value.
    ///
    /// Fails with `LineNotFound` if no line has this id.
    async fn update_line(&self, line_id: CartLineId, update: CartLineUpdate)
    -> Result<CartLineItem>;

    /// Removes the user's line for a product.
    ///
    /// Returns true if a line was removed, false if none existed.
    async fn remove_line(&self, user_id: UserId, product_id: &ProductId) -> Result<bool>;

    /// Removes every line in the user's cart.
    ///
    /// Returns the number of lines removed.
    async fn clear_cart(&self, user_id: UserId) -> Result<u64>;

    /// Retrieves the user's cart lines.
    ///
    /// Lines are returned in the order they were first added (oldest first).
    async fn cart_lines(&self, user_id: UserId) -> Result<Vec<CartLineItem>>;

    /// Returns the total quantity across the user's lines.
    ///
    /// This is the sum of per-line quantities, not the number of lines.
    async fn item_count(&self, user_id: UserId) -> Result<u32>;
}

/// Persistence for placed orders.
///
/// Orders are written once and only their status changes afterwards. Order
/// numbers are assigned by the store at save time, sequentially.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order and assigns its number.
    ///
    /// The write is atomic: either the whole order is stored or nothing is.
    async fn save_order(&self, new_order: NewOrder) -> Result<Order>;

    /// Retrieves a single order.
    ///
    /// Returns None if no order has this id.
    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Retrieves orders matching a filter, newest first.
    async fn find_orders(&self, filter: OrderFilter) -> Result<Vec<Order>>;

    /// Moves an order to a new status.
    ///
    /// The stored order is loaded and the transition is applied through the
    /// order state machine, so an edge the machine does not allow fails with
    /// `InvalidTransition` and leaves the row untouched. Fails with
    /// `OrderNotFound` if no order has this id.
    ///
    /// Returns the updated order.
    async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order>;
}

/// Extension trait providing convenience methods for order stores.
#[async_trait]
pub trait OrderStoreExt: OrderStore {
    /// Retrieves all of a user's orders, newest first.
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        self.find_orders(OrderFilter::for_user(user_id)).await
    }

    /// Checks if an order exists.
    async fn order_exists(&self, order_id: OrderId) -> Result<bool> {
        Ok(self.get_order(order_id).await?.is_some())
    }

    /// Cancels an order. Sugar for a transition to `Cancelled`.
    async fn cancel_order(&self, order_id: OrderId) -> Result<Order> {
        self.update_status(order_id, OrderStatus::Cancelled).await
    }
}

// Blanket implementation for all OrderStore implementations
impl<T: OrderStore + ?Sized> OrderStoreExt for T {}
