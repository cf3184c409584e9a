//! # Catalog Adapter
//!
//! The catalog (static product data or the commerce API) describes products
//! with a display price string. The cart works in [`Money`]. This module is
//! the one place where the two meet, so the transition engine never parses
//! price strings.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::CartProduct;
use crate::validation::{parse_display_price, validate_product_id};

/// A product as the catalog presents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,

    /// Display-formatted price, e.g. `"$29.99 USD"`.
    pub price: String,

    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub slug: String,
}

impl CatalogEntry {
    /// Numeric unit price of this entry.
    pub fn unit_price(&self) -> CoreResult<Money> {
        parse_display_price(&self.price).map_err(|e| CoreError::InvalidCatalogEntry {
            product_id: self.id.clone(),
            reason: e.to_string(),
        })
    }

    /// Converts the entry into what `add_to_cart` accepts.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::CatalogEntry;
    ///
    /// let entry = CatalogEntry {
    ///     id: "1".into(),
    ///     title: "Outside-Zone Tech T-Shirt".into(),
    ///     price: "$29.99 USD".into(),
    ///     image: "/images/products/tshirt.jpg".into(),
    ///     slug: "outside-zone-tech-tshirt".into(),
    /// };
    /// let product = entry.to_cart_product().unwrap();
    /// assert_eq!(product.unit_price.cents(), 2999);
    /// ```
    pub fn to_cart_product(&self) -> CoreResult<CartProduct> {
        validate_product_id(&self.id)?;
        let unit_price = self.unit_price()?;

        Ok(CartProduct {
            id: self.id.clone(),
            title: self.title.clone(),
            image: self.image.clone(),
            slug: self.slug.clone(),
            unit_price,
        })
    }
}

impl TryFrom<&CatalogEntry> for CartProduct {
    type Error = CoreError;

    fn try_from(entry: &CatalogEntry) -> CoreResult<Self> {
        entry.to_cart_product()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
