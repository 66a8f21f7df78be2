//! Cart line items and their update rules.

mod line;

pub use line::{CartLineItem, CartLineUpdate};
