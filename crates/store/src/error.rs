use common::OrderId;
use domain::DomainError;
use thiserror::Error;

/// Errors that can occur when interacting with the cart and order stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The order was not found in the store.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A domain rule was violated while applying the change.
    ///
    /// Stores apply mutations through the domain types, so quantity checks
    /// and status transition checks surface here unchanged.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The store could not serve the request.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
