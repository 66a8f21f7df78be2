//! Cart line items.

use chrono::{DateTime, Utc};
use common::{CartLineId, UserId};
use serde::{Deserialize, Serialize};

use crate::delivery::DeliveryOption;
use crate::error::DomainError;
use crate::money::Money;
use crate::product::ProductId;

/// One (product, quantity, delivery option) entry in a user's cart.
///
/// A line is unique per (user, product): adding a product that is already in
/// the cart merges into the existing line instead of duplicating it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Stable line identifier, assigned when the line is first created.
    pub id: CartLineId,

    /// The user owning this cart line.
    pub user_id: UserId,

    /// The product referenced by this line (owned by the catalog).
    pub product_id: ProductId,

    /// Quantity, always at least 1.
    pub quantity: u32,

    /// Shipping tier chosen for this line.
    pub delivery_option: DeliveryOption,

    /// When the line was first added, used for insertion ordering.
    pub added_at: DateTime<Utc>,
}

impl CartLineItem {
    /// Creates a new cart line.
    ///
    /// Fails with [`DomainError::InvalidQuantity`] if the quantity is zero.
    pub fn new(
        user_id: UserId,
        product_id: impl Into<ProductId>,
        quantity: u32,
        delivery_option: DeliveryOption,
    ) -> Result<Self, DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity { quantity });
        }
        Ok(Self {
            id: CartLineId::new(),
            user_id,
            product_id: product_id.into(),
            quantity,
            delivery_option,
            added_at: Utc::now(),
        })
    }

    /// Merges another add of the same product into this line.
    ///
    /// The quantity is incremented. The delivery option only changes when the
    /// add explicitly carries one; `None` leaves the stored option untouched.
    ///
    /// Fails with [`DomainError::InvalidQuantity`] if the added quantity is
    /// zero or the combined quantity does not fit in a `u32`.
    pub fn merge_add(
        &mut self,
        quantity: u32,
        delivery_option: Option<DeliveryOption>,
    ) -> Result<(), DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity { quantity });
        }
        self.quantity = self
            .quantity
            .checked_add(quantity)
            .ok_or(DomainError::InvalidQuantity { quantity })?;
        if let Some(option) = delivery_option {
            self.delivery_option = option;
        }
        Ok(())
    }

    /// Applies a partial update: only the supplied fields change.
    pub fn apply_update(&mut self, update: &CartLineUpdate) -> Result<(), DomainError> {
        if let Some(quantity) = update.quantity {
            if quantity < 1 {
                return Err(DomainError::InvalidQuantity { quantity });
            }
            self.quantity = quantity;
        }
        if let Some(option) = update.delivery_option {
            self.delivery_option = option;
        }
        Ok(())
    }

    /// Returns the line total for a given unit price.
    pub fn line_total(&self, unit_price: Money) -> Money {
        unit_price.multiply(self.quantity)
    }
}

/// Partial update to a cart line. Absent fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartLineUpdate {
    /// New quantity, if supplied.
    pub quantity: Option<u32>,

    /// New delivery option, if supplied.
    pub delivery_option: Option<DeliveryOption>,
}

impl CartLineUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the quantity to update to.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Sets the delivery option to update to.
    pub fn with_delivery_option(mut self, delivery_option: DeliveryOption) -> Self {
        self.delivery_option = Some(delivery_option);
        self
    }

    /// Returns true if the update carries no fields.
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.delivery_option.is_none()
    }
}
