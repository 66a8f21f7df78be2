//! Cart and order persistence.

pub mod error;
pub mod filter;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use filter::OrderFilter;
pub use memory::{InMemoryCartStore, InMemoryOrderStore};
pub use postgres::PostgresStore;
pub use store::{CartStore, OrderStore, OrderStoreExt};
