//! Domain layer for the storefront system.
//!
//! This crate provides the core domain model:
//! - Money in integer cents with exact arithmetic and display formatting
//! - Cart line items with merge-on-add and typed partial updates
//! - Order snapshots with price-at-time items and a frozen total
//! - The order status state machine (forward-only, cancel while pending)
//!
//! Everything here is pure: persistence and catalog lookups live behind
//! collaborator traits in the surrounding crates.

pub mod cart;
pub mod delivery;
pub mod error;
pub mod money;
pub mod order;
pub mod product;

pub use cart::{CartLineItem, CartLineUpdate};
pub use delivery::DeliveryOption;
pub use error::DomainError;
pub use money::Money;
pub use order::{NewOrder, Order, OrderItem, OrderStatus, PaymentMethod};
pub use product::ProductId;
