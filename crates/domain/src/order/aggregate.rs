//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::cart::CartLineItem;
use crate::delivery::DeliveryOption;
use crate::error::DomainError;
use crate::money::Money;
use crate::product::ProductId;

use super::{OrderStatus, PaymentMethod};

/// Snapshot of a cart line taken at order time.
///
/// The unit price is captured once (`price_at_time`) and never recomputed
/// from the live catalog afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The product identifier.
    pub product_id: ProductId,

    /// Human-readable product name at order time.
    pub product_name: String,

    /// Quantity ordered.
    pub quantity: u32,

    /// Shipping tier the line was ordered with.
    pub delivery_option: DeliveryOption,

    /// Unit price in cents captured at order creation.
    pub price_at_time: Money,
}

impl OrderItem {
    /// Creates a new order item.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        quantity: u32,
        delivery_option: DeliveryOption,
        price_at_time: Money,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            delivery_option,
            price_at_time,
        }
    }

    /// Snapshots a cart line with the unit price resolved at order time.
    pub fn from_line(
        line: &CartLineItem,
        product_name: impl Into<String>,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id: line.product_id.clone(),
            product_name: product_name.into(),
            quantity: line.quantity,
            delivery_option: line.delivery_option,
            price_at_time: unit_price,
        }
    }

    /// Returns the total price for this item (quantity * price_at_time).
    pub fn total_price(&self) -> Money {
        self.price_at_time.multiply(self.quantity)
    }
}

/// A fully built order that has not been persisted yet.
///
/// The persisting store assigns the order number and turns this into an
/// [`Order`] via [`NewOrder::into_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    user_id: UserId,
    shipping_address: String,
    payment_method: PaymentMethod,
    items: Vec<OrderItem>,
    total_amount: Money,
    ordered_at: DateTime<Utc>,
}

impl NewOrder {
    /// Builds an order from priced item snapshots.
    ///
    /// The total is computed here as the exact sum of line totals and frozen.
    /// Fails with [`DomainError::EmptyOrder`] when no items are supplied and
    /// [`DomainError::InvalidQuantity`] when any item has a zero quantity.
    pub fn from_items(
        user_id: UserId,
        shipping_address: impl Into<String>,
        payment_method: PaymentMethod,
        items: Vec<OrderItem>,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let mut total_amount = Money::zero();
        for item in &items {
            if item.quantity < 1 {
                return Err(DomainError::InvalidQuantity {
                    quantity: item.quantity,
                });
            }
            total_amount += item.total_price();
        }
        Ok(Self {
            user_id,
            shipping_address: shipping_address.into(),
            payment_method,
            items,
            total_amount,
            ordered_at: Utc::now(),
        })
    }

    /// Returns the user placing the order.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the shipping address.
    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    /// Returns the payment method.
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Returns the item snapshots.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns the frozen total.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns when the order was placed.
    pub fn ordered_at(&self) -> DateTime<Utc> {
        self.ordered_at
    }

    /// Completes the order with its store-assigned number. Status starts at
    /// [`OrderStatus::Pending`].
    pub fn into_order(self, id: OrderId) -> Order {
        Order {
            id,
            user_id: self.user_id,
            status: OrderStatus::Pending,
            shipping_address: self.shipping_address,
            payment_method: self.payment_method,
            items: self.items,
            total_amount: self.total_amount,
            ordered_at: self.ordered_at,
            delivered_at: None,
        }
    }
}

/// A placed order.
///
/// Immutable once created except for its status, which only changes through
/// [`Order::transition`] so the state machine rules are enforced in one
/// place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Store-assigned order number.
    id: OrderId,

    /// The user who placed the order.
    user_id: UserId,

    /// Current lifecycle status.
    status: OrderStatus,

    /// Free-text shipping address.
    shipping_address: String,

    /// Payment method tag.
    payment_method: PaymentMethod,

    /// Item snapshots, owned exclusively by this order.
    items: Vec<OrderItem>,

    /// Total amount frozen at creation.
    total_amount: Money,

    /// When the order was placed.
    ordered_at: DateTime<Utc>,

    /// When the order reached the customer, if it has.
    delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Reassembles an order from stored state.
    ///
    /// Intended for store implementations; application code obtains orders
    /// through checkout and the store queries.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: OrderId,
        user_id: UserId,
        status: OrderStatus,
        shipping_address: String,
        payment_method: PaymentMethod,
        items: Vec<OrderItem>,
        total_amount: Money,
        ordered_at: DateTime<Utc>,
        delivered_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            user_id,
            status,
            shipping_address,
            payment_method,
            items,
            total_amount,
            ordered_at,
            delivered_at,
        }
    }

    /// Returns the order number.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the user who placed the order.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the shipping address.
    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    /// Returns the payment method.
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Returns the item snapshots.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns the total quantity across all items.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Returns the total frozen at creation.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns when the order was placed.
    pub fn ordered_at(&self) -> DateTime<Utc> {
        self.ordered_at
    }

    /// Returns when the order was delivered, if it has been.
    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// Returns true if the order is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns true if the order can still be cancelled.
    pub fn is_cancellable(&self) -> bool {
        self.status.can_cancel()
    }

    /// Moves the order to a new status.
    ///
    /// The only mutation an order supports. Fails with
    /// [`DomainError::InvalidTransition`] when the state machine does not
    /// allow the edge. Entering [`OrderStatus::Delivered`] records the
    /// delivery time.
    pub fn transition(&mut self, next: OrderStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        if next == OrderStatus::Delivered {
            self.delivered_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Cancels the order. Sugar for a transition to
    /// [`OrderStatus::Cancelled`], so it fails unless the order is pending.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition(OrderStatus::Cancelled)
    }
}
