//! Shared identifier types used across the storefront crates.

pub mod types;

pub use types::{CartLineId, OrderId, UserId};
