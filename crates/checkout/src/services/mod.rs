//! Collaborator traits and in-memory implementations.

pub mod catalog;
pub mod session;

pub use catalog::{Catalog, InMemoryCatalog, Product, ProductUpdate, Rating};
pub use session::{CredentialStore, Identity, InMemorySessions};
