//! Order placement and lifecycle operations.

use std::time::Instant;

use common::OrderId;
use domain::{NewOrder, Order, OrderItem, OrderStatus, PaymentMethod};
use store::{CartStore, OrderFilter, OrderStore};

use crate::error::{CheckoutError, Result};
use crate::services::catalog::Catalog;
use crate::services::session::{CredentialStore, Identity};

/// Order operations for a storefront user.
///
/// Checkout snapshots the cart against current catalog prices, persists
/// the order, and only then clears the cart. Status changes go through
/// the store, which revalidates every transition against the current row.
pub struct OrderService<OS, CS, C, A>
where
    OS: OrderStore,
    CS: CartStore,
    C: Catalog,
    A: CredentialStore,
{
    order_store: OS,
    cart_store: CS,
    catalog: C,
    sessions: A,
}

impl<OS, CS, C, A> OrderService<OS, CS, C, A>
where
    OS: OrderStore,
    CS: CartStore,
    C: Catalog,
    A: CredentialStore,
{
    /// Creates a new order service.
    pub fn new(order_store: OS, cart_store: CS, catalog: C, sessions: A) -> Self {
        Self {
            order_store,
            cart_store,
            catalog,
            sessions,
        }
    }

    /// Places an order from the user's cart.
    ///
    /// Reads the cart, resolves every product against the catalog, freezes
    /// unit prices and the total, and persists the order with status
    /// `PENDING`. Fails with [`domain::DomainError::EmptyOrder`] when the
    /// cart is empty and [`domain::DomainError::ProductNotFound`] when a
    /// line's product cannot be resolved; in both cases nothing is
    /// persisted and the cart is untouched. The cart is cleared only after
    /// the order is saved, and a failed clear leaves the order in place.
    #[tracing::instrument(skip(self, identity, shipping_address), fields(user_id = %identity.user_id))]
    pub async fn checkout(
        &self,
        identity: &Identity,
        shipping_address: &str,
        payment_method: PaymentMethod,
    ) -> Result<Order> {
        let start = Instant::now();
        metrics::counter!("checkout_attempts_total").increment(1);

        let user_id = self.sessions.authenticate(identity).await?;
        let lines = self.cart_store.cart_lines(user_id).await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = self.catalog.get_product(&line.product_id).await?;
            items.push(OrderItem::from_line(line, product.name, product.price));
        }

        let new_order = NewOrder::from_items(user_id, shipping_address, payment_method, items)?;
        let order = self.order_store.save_order(new_order).await?;

        if let Err(err) = self.cart_store.clear_cart(user_id).await {
            tracing::warn!(order_id = %order.id(), error = %err, "cart clear after checkout failed");
        }

        metrics::counter!("orders_created_total").increment(1);
        metrics::histogram!("checkout_duration_seconds").record(start.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id(), total = %order.total_amount(), "order placed");

        Ok(order)
    }

    /// Returns the order with the given ID.
    pub async fn get_order(&self, identity: &Identity, order_id: OrderId) -> Result<Order> {
        self.sessions.authenticate(identity).await?;
        self.order_store
            .get_order(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))
    }

    /// Returns the user's orders, newest first, optionally narrowed to a
    /// single status.
    pub async fn list_orders(
        &self,
        identity: &Identity,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>> {
        let user_id = self.sessions.authenticate(identity).await?;
        let mut filter = OrderFilter::for_user(user_id);
        if let Some(status) = status {
            filter = filter.status(status);
        }
        Ok(self.order_store.find_orders(filter).await?)
    }

    /// Returns all orders in the given status across users, newest first.
    /// This is the fulfilment view, not scoped to the caller.
    pub async fn orders_by_status(
        &self,
        identity: &Identity,
        status: OrderStatus,
    ) -> Result<Vec<Order>> {
        self.sessions.authenticate(identity).await?;
        let filter = OrderFilter::new().status(status);
        Ok(self.order_store.find_orders(filter).await?)
    }

    /// Moves an order to a new status.
    ///
    /// The store revalidates the edge against the current row, so a stale
    /// caller gets [`domain::DomainError::InvalidTransition`] rather than a
    /// silent overwrite.
    pub async fn update_status(
        &self,
        identity: &Identity,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order> {
        self.sessions.authenticate(identity).await?;
        let order = self.order_store.update_status(order_id, status).await?;

        metrics::counter!("order_status_updates_total").increment(1);
        tracing::info!(order_id = %order_id, status = %status, "order status updated");
        Ok(order)
    }

    /// Cancels a pending order. Anything past `PENDING` is refused.
    pub async fn cancel_order(&self, identity: &Identity, order_id: OrderId) -> Result<Order> {
        let order = self
            .update_status(identity, order_id, OrderStatus::Cancelled)
            .await?;
        metrics::counter!("orders_cancelled_total").increment(1);
        Ok(order)
    }
}
