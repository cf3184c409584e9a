//! # Domain Types
//!
//! The line-level types the cart is made of.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   add_to_cart    ┌─────────────────┐              │
//! │  │   CartProduct   │ ───────────────► │  CartLineItem   │              │
//! │  │  ─────────────  │                  │  ─────────────  │              │
//! │  │  id             │                  │  id (line key)  │              │
//! │  │  title          │                  │  title          │              │
//! │  │  image          │                  │  image          │              │
//! │  │  slug           │                  │  slug           │              │
//! │  │  unit_price     │                  │  unit_price     │              │
//! │  └─────────────────┘                  │  quantity ≥ 1   │              │
//! │                                       └─────────────────┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `title`, `image` and `slug` are display metadata. The cart carries them
//! along for the drawer and never inspects them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Cart Product
// =============================================================================

/// What a storefront view hands to `add_to_cart`: a product without a
/// quantity, with its price already converted to [`Money`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartProduct {
    /// Stable product identifier (line key inside the cart).
    pub id: String,

    /// Product title shown in the drawer.
    pub title: String,

    /// Image path or URL.
    #[serde(default)]
    pub image: String,

    /// Product page slug.
    #[serde(default)]
    pub slug: String,

    /// Price of one unit.
    pub unit_price: Money,
}

impl CartProduct {
    /// Creates a product with empty display metadata.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::{CartProduct, Money};
    ///
    /// let cap = CartProduct::new("9", "Trail Cap", Money::from_cents(1999))
    ///     .with_slug("trail-cap");
    /// assert_eq!(cap.slug, "trail-cap");
    /// ```
    pub fn new(id: impl Into<String>, title: impl Into<String>, unit_price: Money) -> Self {
        CartProduct {
            id: id.into(),
            title: title.into(),
            image: String::new(),
            slug: String::new(),
            unit_price,
        }
    }

    /// Sets the image path.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Sets the product page slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }
}

// =============================================================================
// Cart Line Item
// =============================================================================

/// One product line in the cart with its own quantity.
///
/// ## Invariants
/// - `quantity >= 1` (a line with quantity 0 is removed, never stored)
/// - `id` is unique within a cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLineItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub slug: String,

    /// Price of one unit, frozen when the line was first added.
    pub unit_price: Money,

    pub quantity: u32,
}

impl CartLineItem {
    /// Opens a new line with quantity 1 at the given price.
    pub fn open(product: CartProduct, unit_price: Money) -> Self {
        CartLineItem {
            id: product.id,
            title: product.title,
            image: product.image,
            slug: product.slug,
            unit_price,
            quantity: 1,
        }
    }

    /// Calculates the line total (unit price × quantity).
    ///
    /// `None` only for a stored line whose total does not fit in [`Money`];
    /// lines built by the cart itself always have one.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul_quantity(i64::from(self.quantity))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
