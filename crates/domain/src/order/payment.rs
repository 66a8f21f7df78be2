//! Payment method tags.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Payment method recorded on an order.
///
/// A closed tag; actual payment processing happens outside this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Credit card.
    CreditCard,

    /// Debit card.
    DebitCard,

    /// PayPal.
    Paypal,
}

impl PaymentMethod {
    /// Returns the wire tag for this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Paypal => "paypal",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "debit_card" => Ok(PaymentMethod::DebitCard),
            "paypal" => Ok(PaymentMethod::Paypal),
            other => Err(DomainError::UnknownPaymentMethod {
                value: other.to_string(),
            }),
        }
    }
}
