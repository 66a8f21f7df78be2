//! Cart and order operations for the storefront.
//!
//! This crate wires the domain model to its collaborators: the cart and
//! order stores, the product catalog, and the credential store.
//!
//! The checkout flow follows these steps:
//! 1. Verify the caller's identity (fail closed)
//! 2. Snapshot the cart against current catalog prices
//! 3. Persist the order with a frozen total
//! 4. Clear the cart
//!
//! If any step before persistence fails, nothing is written; a failure
//! while clearing the cart is logged and leaves the saved order in place.

pub mod cart;
pub mod error;
pub mod orders;
pub mod services;

pub use cart::{CartEntry, CartService};
pub use error::{CheckoutError, Result};
pub use orders::OrderService;
pub use services::{
    Catalog, CredentialStore, Identity, InMemoryCatalog, InMemorySessions, Product, ProductUpdate,
    Rating,
};
