//! Product catalog trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{DomainError, Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, Result};

/// Star rating shown on a product card.
///
/// Stored in half-star steps so 4.5-star ratings stay exact; the wire
/// format is the fractional `stars/count` pair clients already use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RatingRepr", into = "RatingRepr")]
pub struct Rating {
    half_stars: u8,
    count: u32,
}

impl Rating {
    /// Creates a rating from a fractional star value, rounded to the
    /// nearest half star and clamped to the 0 to 5 range.
    pub fn new(stars: f32, count: u32) -> Self {
        let half_stars = (stars.clamp(0.0, 5.0) * 2.0).round() as u8;
        Self { half_stars, count }
    }

    /// Returns the star value as a fraction, e.g. 4.5.
    pub fn stars(&self) -> f32 {
        f32::from(self.half_stars) / 2.0
    }

    /// Returns the number of reviews behind the rating.
    pub fn count(&self) -> u32 {
        self.count
    }
}

#[derive(Serialize, Deserialize)]
struct RatingRepr {
    stars: f32,
    count: u32,
}

impl From<RatingRepr> for Rating {
    fn from(repr: RatingRepr) -> Self {
        Rating::new(repr.stars, repr.count)
    }
}

impl From<Rating> for RatingRepr {
    fn from(rating: Rating) -> Self {
        RatingRepr {
            stars: rating.stars(),
            count: rating.count,
        }
    }
}

/// A catalog product.
///
/// The catalog owns product data; cart lines and order items reference
/// it by [`ProductId`] and join against it at read or checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Path to the product image.
    pub image: String,

    /// Star rating.
    pub rating: Rating,

    /// Current unit price.
    pub price: Money,

    /// Search keywords.
    pub keywords: Vec<String>,

    /// Category tag, e.g. "clothing".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,

    /// Path to a size chart image for sized products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_chart_link: Option<String>,
}

impl Product {
    /// Returns true if the keyword matches the name or any keyword,
    /// case-insensitively on substrings.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(&needle))
    }

    /// Applies a partial update in place.
    pub fn apply_update(&mut self, update: ProductUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(image) = update.image {
            self.image = image;
        }
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(keywords) = update.keywords {
            self.keywords = keywords;
        }
        if let Some(product_type) = update.product_type {
            self.product_type = Some(product_type);
        }
        if let Some(size_chart_link) = update.size_chart_link {
            self.size_chart_link = Some(size_chart_link);
        }
    }
}

/// A partial update to a product. Only supplied fields change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    /// New display name, if supplied.
    pub name: Option<String>,

    /// New image path, if supplied.
    pub image: Option<String>,

    /// New rating, if supplied.
    pub rating: Option<Rating>,

    /// New unit price, if supplied.
    pub price: Option<Money>,

    /// New keyword list, if supplied. Replaces the whole list.
    pub keywords: Option<Vec<String>>,

    /// New category tag, if supplied.
    pub product_type: Option<String>,

    /// New size chart path, if supplied.
    pub size_chart_link: Option<String>,
}

impl ProductUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name to update to.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the image path to update to.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Sets the rating to update to.
    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Sets the price to update to.
    pub fn with_price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the keyword list to update to.
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = Some(keywords);
        self
    }

    /// Sets the category tag to update to.
    pub fn with_product_type(mut self, product_type: impl Into<String>) -> Self {
        self.product_type = Some(product_type.into());
        self
    }

    /// Sets the size chart path to update to.
    pub fn with_size_chart_link(mut self, size_chart_link: impl Into<String>) -> Self {
        self.size_chart_link = Some(size_chart_link.into());
        self
    }

    /// Returns true if the update carries no fields.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.image.is_none()
            && self.rating.is_none()
            && self.price.is_none()
            && self.keywords.is_none()
            && self.product_type.is_none()
            && self.size_chart_link.is_none()
    }
}

/// Trait for product catalog operations.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Returns all products.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Returns the product with the given ID.
    ///
    /// Fails with [`DomainError::ProductNotFound`] when no product has it.
    async fn get_product(&self, id: &ProductId) -> Result<Product>;

    /// Returns products whose name or keywords contain the keyword,
    /// case-insensitively.
    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>>;

    /// Returns products with the given category tag.
    async fn products_by_type(&self, product_type: &str) -> Result<Vec<Product>>;

    /// Returns products rated at or above the given star value.
    async fn products_by_min_rating(&self, min_stars: f32) -> Result<Vec<Product>>;

    /// Returns products priced within the inclusive range.
    async fn products_in_price_range(&self, min: Money, max: Money) -> Result<Vec<Product>>;

    /// Adds a product, replacing any existing product with the same ID.
    ///
    /// Fails with [`DomainError::InvalidAmount`] when the price is negative.
    async fn create_product(&self, product: Product) -> Result<Product>;

    /// Applies a partial update to the product with the given ID.
    ///
    /// Fails with [`DomainError::ProductNotFound`] when no product has it,
    /// [`DomainError::InvalidAmount`] when the new price is negative.
    async fn update_product(&self, id: &ProductId, update: ProductUpdate) -> Result<Product>;

    /// Removes the product with the given ID, returning whether it existed.
    async fn delete_product(&self, id: &ProductId) -> Result<bool>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: Vec<Product>,
    fail_on_read: bool,
}

/// In-memory catalog for demos and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog stocked with the demo storefront products.
    pub fn with_demo_products() -> Self {
        let catalog = Self::new();
        catalog.state.write().unwrap().products = demo_products();
        catalog
    }

    /// Configures read operations to fail until cleared.
    pub fn set_fail_on_read(&self, fail: bool) {
        self.state.write().unwrap().fail_on_read = fail;
    }

    /// Returns the number of products in the catalog.
    pub fn product_count(&self) -> usize {
        self.state.read().unwrap().products.len()
    }
}

fn unavailable() -> CheckoutError {
    CheckoutError::CollaboratorUnavailable {
        collaborator: "catalog",
        reason: "catalog reads are disabled".to_string(),
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let state = self.state.read().unwrap();
        if state.fail_on_read {
            return Err(unavailable());
        }
        Ok(state.products.clone())
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product> {
        let state = self.state.read().unwrap();
        if state.fail_on_read {
            return Err(unavailable());
        }
        state
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| {
                DomainError::ProductNotFound {
                    product_id: id.clone(),
                }
                .into()
            })
    }

    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>> {
        let state = self.state.read().unwrap();
        if state.fail_on_read {
            return Err(unavailable());
        }
        Ok(state
            .products
            .iter()
            .filter(|p| p.matches_keyword(keyword))
            .cloned()
            .collect())
    }

    async fn products_by_type(&self, product_type: &str) -> Result<Vec<Product>> {
        let state = self.state.read().unwrap();
        if state.fail_on_read {
            return Err(unavailable());
        }
        Ok(state
            .products
            .iter()
            .filter(|p| p.product_type.as_deref() == Some(product_type))
            .cloned()
            .collect())
    }

    async fn products_by_min_rating(&self, min_stars: f32) -> Result<Vec<Product>> {
        let state = self.state.read().unwrap();
        if state.fail_on_read {
            return Err(unavailable());
        }
        Ok(state
            .products
            .iter()
            .filter(|p| p.rating.stars() >= min_stars)
            .cloned()
            .collect())
    }

    async fn products_in_price_range(&self, min: Money, max: Money) -> Result<Vec<Product>> {
        let state = self.state.read().unwrap();
        if state.fail_on_read {
            return Err(unavailable());
        }
        Ok(state
            .products
            .iter()
            .filter(|p| min <= p.price && p.price <= max)
            .cloned()
            .collect())
    }

    async fn create_product(&self, product: Product) -> Result<Product> {
        if product.price.is_negative() {
            return Err(DomainError::InvalidAmount {
                cents: product.price.cents(),
            }
            .into());
        }
        let mut state = self.state.write().unwrap();
        if let Some(existing) = state.products.iter_mut().find(|p| p.id == product.id) {
            *existing = product.clone();
        } else {
            state.products.push(product.clone());
        }
        Ok(product)
    }

    async fn update_product(&self, id: &ProductId, update: ProductUpdate) -> Result<Product> {
        if let Some(price) = update.price
            && price.is_negative()
        {
            return Err(DomainError::InvalidAmount {
                cents: price.cents(),
            }
            .into());
        }
        let mut state = self.state.write().unwrap();
        let Some(product) = state.products.iter_mut().find(|p| &p.id == id) else {
            return Err(DomainError::ProductNotFound {
                product_id: id.clone(),
            }
            .into());
        };
        product.apply_update(update);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<bool> {
        let mut state = self.state.write().unwrap();
        let before = state.products.len();
        state.products.retain(|p| &p.id != id);
        Ok(state.products.len() < before)
    }
}

fn demo_products() -> Vec<Product> {
    vec![
        Product {
            id: "e43638ce-6aa0-4b85-b27f-e1d07eb678c6".into(),
            name: "Black and Gray Athletic Cotton Socks - 6 Pairs".to_string(),
            image: "images/products/athletic-cotton-socks-6-pairs.jpg".to_string(),
            rating: Rating::new(4.5, 87),
            price: Money::from_cents(1090),
            keywords: vec![
                "socks".to_string(),
                "sports".to_string(),
                "apparel".to_string(),
            ],
            product_type: None,
            size_chart_link: None,
        },
        Product {
            id: "15b6fc6f-327a-4ec4-896f-486349e85a3d".into(),
            name: "Intermediate Size Basketball".to_string(),
            image: "images/products/intermediate-composite-basketball.jpg".to_string(),
            rating: Rating::new(4.0, 127),
            price: Money::from_cents(2095),
            keywords: vec!["sports".to_string(), "basketballs".to_string()],
            product_type: None,
            size_chart_link: None,
        },
        Product {
            id: "83d4ca15-0f35-48f5-b7a3-1ea210004f2e".into(),
            name: "Adults Plain Cotton T-Shirt - 2 Pack".to_string(),
            image: "images/products/adults-plain-cotton-tshirt-2-pack-teal.jpg".to_string(),
            rating: Rating::new(4.5, 56),
            price: Money::from_cents(799),
            keywords: vec![
                "tshirts".to_string(),
                "apparel".to_string(),
                "mens".to_string(),
            ],
            product_type: Some("clothing".to_string()),
            size_chart_link: Some("images/clothing-size-chart.png".to_string()),
        },
        Product {
            id: "54e0eccd-8f36-462b-b68a-8182611d9add".into(),
            name: "2 Slot Toaster - Black".to_string(),
            image: "images/products/black-2-slot-toaster.jpg".to_string(),
            rating: Rating::new(5.0, 2197),
            price: Money::from_cents(1899),
            keywords: vec![
                "toaster".to_string(),
                "kitchen".to_string(),
                "appliances".to_string(),
            ],
            product_type: None,
            size_chart_link: None,
        },
        Product {
            id: "3ebe75dc-64d2-4137-8860-1f5a963e534b".into(),
            name: "6 Piece White Dinner Plate Set".to_string(),
            image: "images/products/6-piece-white-dinner-plate-set.jpg".to_string(),
            rating: Rating::new(4.0, 37),
            price: Money::from_cents(2067),
            keywords: vec![
                "plates".to_string(),
                "kitchen".to_string(),
                "dining".to_string(),
            ],
            product_type: None,
            size_chart_link: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOCKS_ID: &str = "e43638ce-6aa0-4b85-b27f-e1d07eb678c6";

    #[tokio::test]
    async fn test_demo_catalog_lists_all_products() {
        let catalog = InMemoryCatalog::with_demo_products();
        assert_eq!(catalog.product_count(), 5);
        assert_eq!(catalog.list_products().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_get_product_by_id() {
        let catalog = InMemoryCatalog::with_demo_products();
        let product = catalog.get_product(&SOCKS_ID.into()).await.unwrap();
        assert_eq!(
            product.name,
            "Black and Gray Athletic Cotton Socks - 6 Pairs"
        );
        assert_eq!(product.price, Money::from_cents(1090));
        assert_eq!(product.rating.stars(), 4.5);
        assert_eq!(product.rating.count(), 87);
    }

    #[tokio::test]
    async fn test_get_missing_product_fails() {
        let catalog = InMemoryCatalog::with_demo_products();
        let err = catalog.get_product(&"no-such-id".into()).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Domain(DomainError::ProductNotFound { product_id })
                if product_id.as_str() == "no-such-id"
        ));
    }

    #[tokio::test]
    async fn test_search_matches_name_and_keywords() {
        let catalog = InMemoryCatalog::with_demo_products();

        let by_keyword = catalog.search_products("kitchen").await.unwrap();
        assert_eq!(by_keyword.len(), 2);

        let by_name = catalog.search_products("BASKET").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Intermediate Size Basketball");

        assert!(catalog.search_products("zucchini").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_products_by_type() {
        let catalog = InMemoryCatalog::with_demo_products();
        let clothing = catalog.products_by_type("clothing").await.unwrap();
        assert_eq!(clothing.len(), 1);
        assert_eq!(clothing[0].name, "Adults Plain Cotton T-Shirt - 2 Pack");
    }

    #[tokio::test]
    async fn test_products_by_min_rating() {
        let catalog = InMemoryCatalog::with_demo_products();
        assert_eq!(catalog.products_by_min_rating(4.5).await.unwrap().len(), 3);
        assert_eq!(catalog.products_by_min_rating(5.0).await.unwrap().len(), 1);
        assert_eq!(catalog.products_by_min_rating(0.0).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_products_in_price_range_is_inclusive() {
        let catalog = InMemoryCatalog::with_demo_products();
        let in_range = catalog
            .products_in_price_range(Money::from_cents(1000), Money::from_cents(2100))
            .await
            .unwrap();
        assert_eq!(in_range.len(), 4);

        let exact = catalog
            .products_in_price_range(Money::from_cents(799), Money::from_cents(799))
            .await
            .unwrap();
        assert_eq!(exact.len(), 1);
    }

    #[tokio::test]
    async fn test_create_and_delete_product() {
        let catalog = InMemoryCatalog::new();
        let product = Product {
            id: "prod-1".into(),
            name: "Test Widget".to_string(),
            image: "images/widget.jpg".to_string(),
            rating: Rating::new(3.5, 10),
            price: Money::from_cents(500),
            keywords: vec!["widget".to_string()],
            product_type: None,
            size_chart_link: None,
        };

        catalog.create_product(product).await.unwrap();
        assert_eq!(catalog.product_count(), 1);

        assert!(catalog.delete_product(&"prod-1".into()).await.unwrap());
        assert_eq!(catalog.product_count(), 0);
        assert!(!catalog.delete_product(&"prod-1".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_rejects_negative_price() {
        let catalog = InMemoryCatalog::new();
        let product = Product {
            id: "prod-1".into(),
            name: "Bad Widget".to_string(),
            image: "images/widget.jpg".to_string(),
            rating: Rating::new(1.0, 1),
            price: Money::from_cents(-1),
            keywords: vec![],
            product_type: None,
            size_chart_link: None,
        };

        let err = catalog.create_product(product).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Domain(DomainError::InvalidAmount { cents: -1 })
        ));
        assert_eq!(catalog.product_count(), 0);
    }

    #[tokio::test]
    async fn test_update_changes_only_supplied_fields() {
        let catalog = InMemoryCatalog::with_demo_products();
        let id: ProductId = SOCKS_ID.into();
        let before = catalog.get_product(&id).await.unwrap();

        let update = ProductUpdate::new()
            .with_name("Athletic Socks - 6 Pairs")
            .with_price(Money::from_cents(990));
        let updated = catalog.update_product(&id, update).await.unwrap();

        assert_eq!(updated.name, "Athletic Socks - 6 Pairs");
        assert_eq!(updated.price, Money::from_cents(990));
        assert_eq!(updated.image, before.image);
        assert_eq!(updated.rating, before.rating);
        assert_eq!(updated.keywords, before.keywords);
    }

    #[tokio::test]
    async fn test_update_missing_product_fails() {
        let catalog = InMemoryCatalog::new();
        let err = catalog
            .update_product(&"ghost".into(), ProductUpdate::new().with_name("Ghost"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Domain(DomainError::ProductNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_rejects_negative_price_without_applying() {
        let catalog = InMemoryCatalog::with_demo_products();
        let id: ProductId = SOCKS_ID.into();

        let update = ProductUpdate::new()
            .with_name("Should Not Stick")
            .with_price(Money::from_cents(-500));
        let err = catalog.update_product(&id, update).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Domain(DomainError::InvalidAmount { cents: -500 })
        ));

        let unchanged = catalog.get_product(&id).await.unwrap();
        assert_eq!(
            unchanged.name,
            "Black and Gray Athletic Cotton Socks - 6 Pairs"
        );
    }

    #[test]
    fn test_rating_round_trips_through_wire_format() {
        let rating = Rating::new(4.5, 87);
        let json = serde_json::to_string(&rating).unwrap();
        assert_eq!(json, r#"{"stars":4.5,"count":87}"#);

        let back: Rating = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rating);
    }

    #[test]
    fn test_rating_clamps_out_of_range_stars() {
        assert_eq!(Rating::new(7.3, 1).stars(), 5.0);
        assert_eq!(Rating::new(-2.0, 1).stars(), 0.0);
        assert_eq!(Rating::new(4.3, 1).stars(), 4.5);
    }

    #[tokio::test]
    async fn test_fail_on_read_returns_unavailable() {
        let catalog = InMemoryCatalog::with_demo_products();
        catalog.set_fail_on_read(true);

        let err = catalog.list_products().await.unwrap_err();
        assert!(err.is_unavailable());

        catalog.set_fail_on_read(false);
        assert_eq!(catalog.list_products().await.unwrap().len(), 5);
    }
}
