//! Order aggregate and related types.

mod aggregate;
mod payment;
mod status;

pub use aggregate::{NewOrder, Order, OrderItem};
pub use payment::PaymentMethod;
pub use status::OrderStatus;
