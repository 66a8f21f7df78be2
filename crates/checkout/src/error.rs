//! Checkout error types.

use common::OrderId;
use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during storefront operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The caller presented no valid identity.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A collaborator could not serve the request.
    #[error("{collaborator} unavailable: {reason}")]
    CollaboratorUnavailable {
        collaborator: &'static str,
        reason: String,
    },

    /// Domain rule violation.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl CheckoutError {
    /// Returns true for collaborator outages, as opposed to rule
    /// violations and missing resources.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CheckoutError::CollaboratorUnavailable { .. })
    }
}

impl From<StoreError> for CheckoutError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(domain) => CheckoutError::Domain(domain),
            StoreError::OrderNotFound(id) => CheckoutError::OrderNotFound(id),
            other => CheckoutError::CollaboratorUnavailable {
                collaborator: "store",
                reason: other.to_string(),
            },
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_pass_through_the_store_layer() {
        let err = CheckoutError::from(StoreError::Domain(DomainError::EmptyOrder));
        assert!(matches!(err, CheckoutError::Domain(DomainError::EmptyOrder)));
    }

    #[test]
    fn test_missing_order_keeps_its_id() {
        let err = CheckoutError::from(StoreError::OrderNotFound(OrderId::from_i64(7)));
        assert!(matches!(
            err,
            CheckoutError::OrderNotFound(id) if id.as_i64() == 7
        ));
    }

    #[test]
    fn test_infrastructure_errors_become_unavailable() {
        let err = CheckoutError::from(StoreError::Unavailable("down".to_string()));
        assert!(err.is_unavailable());
        assert!(err.to_string().starts_with("store unavailable"));
    }
}
