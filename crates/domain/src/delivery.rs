//! Delivery option tags for cart lines and order snapshots.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Shipping tier attached to a cart line and carried into the order snapshot.
///
/// The wire codes are a closed 3-way tag exposed verbatim to callers:
/// `1` = free, `2` = fast, `3` = same-day. Adding a tier requires a
/// coordinated change here and in every client that sends the codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeliveryOption {
    /// Standard free shipping.
    #[default]
    Free,

    /// Expedited shipping.
    Fast,

    /// Same-day delivery.
    SameDay,
}

impl DeliveryOption {
    /// Returns the wire code for this option.
    pub fn code(&self) -> &'static str {
        match self {
            DeliveryOption::Free => "1",
            DeliveryOption::Fast => "2",
            DeliveryOption::SameDay => "3",
        }
    }

    /// Parses a wire code into an option.
    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        match code {
            "1" => Ok(DeliveryOption::Free),
            "2" => Ok(DeliveryOption::Fast),
            "3" => Ok(DeliveryOption::SameDay),
            other => Err(DomainError::UnknownDeliveryOption {
                code: other.to_string(),
            }),
        }
    }

    /// Returns the option name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOption::Free => "FREE",
            DeliveryOption::Fast => "FAST",
            DeliveryOption::SameDay => "SAME_DAY",
        }
    }
}

impl std::fmt::Display for DeliveryOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_free() {
        assert_eq!(DeliveryOption::default(), DeliveryOption::Free);
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(DeliveryOption::Free.code(), "1");
        assert_eq!(DeliveryOption::Fast.code(), "2");
        assert_eq!(DeliveryOption::SameDay.code(), "3");
    }

    #[test]
    fn test_from_code_parses_all_tiers() {
        assert_eq!(DeliveryOption::from_code("1").unwrap(), DeliveryOption::Free);
        assert_eq!(DeliveryOption::from_code("2").unwrap(), DeliveryOption::Fast);
        assert_eq!(
            DeliveryOption::from_code("3").unwrap(),
            DeliveryOption::SameDay
        );
    }

    #[test]
    fn test_from_code_rejects_unknown_codes() {
        let err = DeliveryOption::from_code("4").unwrap_err();
        assert_eq!(
            err,
            DomainError::UnknownDeliveryOption {
                code: "4".to_string()
            }
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(DeliveryOption::Free.to_string(), "FREE");
        assert_eq!(DeliveryOption::Fast.to_string(), "FAST");
        assert_eq!(DeliveryOption::SameDay.to_string(), "SAME_DAY");
    }
}
