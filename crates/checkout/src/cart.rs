//! Cart operations joined with the catalog.

use common::{CartLineId, UserId};
use domain::{CartLineItem, CartLineUpdate, DeliveryOption, Money, ProductId};
use serde::{Deserialize, Serialize};
use store::CartStore;

use crate::error::{CheckoutError, Result};
use crate::services::catalog::{Catalog, Product};
use crate::services::session::{CredentialStore, Identity};

/// A cart line joined with its catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    /// The stored cart line.
    pub line: CartLineItem,

    /// The product the line refers to, at current catalog state.
    pub product: Product,
}

impl CartEntry {
    /// Returns the line total at the current catalog price.
    pub fn line_total(&self) -> Money {
        self.line.line_total(self.product.price)
    }
}

/// Cart operations for a storefront user.
///
/// Every method verifies the caller's identity against the credential
/// store first and fails closed when it cannot. Cart reads are live:
/// totals are resolved against current catalog prices at call time, not
/// frozen like an order's total.
pub struct CartService<S, C, A>
where
    S: CartStore,
    C: Catalog,
    A: CredentialStore,
{
    cart_store: S,
    catalog: C,
    sessions: A,
}

impl<S, C, A> CartService<S, C, A>
where
    S: CartStore,
    C: Catalog,
    A: CredentialStore,
{
    /// Creates a new cart service.
    pub fn new(cart_store: S, catalog: C, sessions: A) -> Self {
        Self {
            cart_store,
            catalog,
            sessions,
        }
    }

    /// Adds a product to the user's cart.
    ///
    /// An existing line for the same product absorbs the quantity; the
    /// delivery option only changes when one is supplied. The product must
    /// exist in the catalog.
    #[tracing::instrument(skip(self, identity), fields(user_id = %identity.user_id, product_id = %product_id))]
    pub async fn add_item(
        &self,
        identity: &Identity,
        product_id: ProductId,
        quantity: u32,
        delivery_option: Option<DeliveryOption>,
    ) -> Result<CartLineItem> {
        let user_id = self.sessions.authenticate(identity).await?;
        self.catalog.get_product(&product_id).await?;

        let line = self
            .cart_store
            .add_line(user_id, product_id, quantity, delivery_option)
            .await?;

        metrics::counter!("cart_adds_total").increment(1);
        tracing::debug!(line_id = %line.id, quantity = line.quantity, "cart line saved");
        Ok(line)
    }

    /// Changes quantity or delivery option on an existing line. Only the
    /// supplied fields change.
    pub async fn update_item(
        &self,
        identity: &Identity,
        line_id: CartLineId,
        update: CartLineUpdate,
    ) -> Result<CartLineItem> {
        self.sessions.authenticate(identity).await?;
        Ok(self.cart_store.update_line(line_id, update).await?)
    }

    /// Removes a product's line from the cart, returning whether one
    /// existed. Removing an absent product is a no-op, not an error.
    pub async fn remove_item(&self, identity: &Identity, product_id: &ProductId) -> Result<bool> {
        let user_id = self.sessions.authenticate(identity).await?;
        Ok(self.cart_store.remove_line(user_id, product_id).await?)
    }

    /// Empties the user's cart, returning the number of removed lines.
    pub async fn clear(&self, identity: &Identity) -> Result<u64> {
        let user_id = self.sessions.authenticate(identity).await?;
        Ok(self.cart_store.clear_cart(user_id).await?)
    }

    /// Returns the cart joined with current catalog products, in insertion
    /// order of first add.
    pub async fn get_cart(&self, identity: &Identity) -> Result<Vec<CartEntry>> {
        let user_id = self.sessions.authenticate(identity).await?;
        let lines = self.cart_store.cart_lines(user_id).await?;

        let mut entries = Vec::with_capacity(lines.len());
        for line in lines {
            let product = self.catalog.get_product(&line.product_id).await?;
            entries.push(CartEntry { line, product });
        }
        Ok(entries)
    }

    /// Returns the sum of quantities across the user's cart lines.
    ///
    /// Degrades to zero instead of failing when the backing store is
    /// unavailable; rule violations still surface.
    pub async fn item_count(&self, identity: &Identity) -> Result<u32> {
        let user_id = self.sessions.authenticate(identity).await?;
        match self
            .cart_store
            .item_count(user_id)
            .await
            .map_err(CheckoutError::from)
        {
            Ok(count) => Ok(count),
            Err(err) if err.is_unavailable() => {
                tracing::warn!(error = %err, "cart count degraded to zero");
                Ok(0)
            }
            Err(err) => Err(err),
        }
    }

    /// Returns the live cart total at current catalog prices.
    ///
    /// Degrades to zero instead of failing when the store or catalog is
    /// unavailable; rule violations still surface.
    pub async fn cart_total(&self, identity: &Identity) -> Result<Money> {
        let user_id = self.sessions.authenticate(identity).await?;
        match self.total_for(user_id).await {
            Ok(total) => Ok(total),
            Err(err) if err.is_unavailable() => {
                tracing::warn!(error = %err, "cart total degraded to zero");
                Ok(Money::zero())
            }
            Err(err) => Err(err),
        }
    }

    async fn total_for(&self, user_id: UserId) -> Result<Money> {
        let lines = self.cart_store.cart_lines(user_id).await?;
        let mut total = Money::zero();
        for line in lines {
            let product = self.catalog.get_product(&line.product_id).await?;
            total += line.line_total(product.price);
        }
        Ok(total)
    }
}
