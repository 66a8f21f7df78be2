//! Domain error types.

use common::CartLineId;
use thiserror::Error;

use crate::order::OrderStatus;
use crate::product::ProductId;

/// Errors that can occur during domain operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Quantity must be at least 1.
    #[error("Invalid quantity: {quantity} (must be at least 1)")]
    InvalidQuantity { quantity: u32 },

    /// Cart line not found.
    #[error("Cart line not found: {line_id}")]
    LineNotFound { line_id: CartLineId },

    /// An order needs at least one line item.
    #[error("Cannot create an order from an empty cart")]
    EmptyOrder,

    /// Product could not be resolved against the catalog.
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: ProductId },

    /// Status change not allowed by the order state machine.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Negative amounts have no display form.
    #[error("Invalid amount: {cents} cents (must be non-negative)")]
    InvalidAmount { cents: i64 },

    /// Unrecognized order status tag.
    #[error("Unknown order status: {value}")]
    UnknownStatus { value: String },

    /// Unrecognized delivery option code.
    #[error("Unknown delivery option code: {code}")]
    UnknownDeliveryOption { code: String },

    /// Unrecognized payment method tag.
    #[error("Unknown payment method: {value}")]
    UnknownPaymentMethod { value: String },
}
