//! # Stored Cart Record
//!
//! The serialized form of a cart inside its key-value slot.
//!
//! ```json
//! {
//!   "version": 1,
//!   "savedAt": "2026-10-19T12:00:00Z",
//!   "items": [{ "id": "1", "title": "Tech T-Shirt", "unitPrice": 2999, "quantity": 2 }],
//!   "subtotal": 5998,
//!   "itemCount": 2
//! }
//! ```
//!
//! Records written before the envelope existed carry no `version` and are
//! read as version 0. A record from a newer release is refused with
//! [`StoreError::UnsupportedVersion`].
//!
//! ## Previous Storefront Format
//! The storefront this cart replaces kept prices in major units as floats,
//! under a `total` aggregate:
//!
//! ```json
//! { "items": [{ "id": "1", "title": "Tech T-Shirt", "price": 29.99, "quantity": 2 }],
//!   "total": 59.98, "itemCount": 2 }
//! ```
//!
//! Such a record (no `version`, a `total` field) is upgraded to version 0:
//! prices are rounded to cents and both aggregates are derived from the
//! lines, since the stored float `total` may have drifted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::{CartLineItem, CartState, Money};

use crate::error::{StoreError, StoreResult};

/// Current record format version.
pub const RECORD_VERSION: u32 = 1;

/// A cart as read back from storage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCart {
    #[serde(default)]
    pub version: u32,

    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub cart: CartState,
}

/// Borrowing twin of [`StoredCart`] so encoding never clones the cart.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredCartRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    #[serde(flatten)]
    cart: &'a CartState,
}

/// Serializes a cart into the current record format.
pub fn encode_cart(cart: &CartState) -> StoreResult<String> {
    let record = StoredCartRef {
        version: RECORD_VERSION,
        saved_at: Utc::now(),
        cart,
    };
    Ok(serde_json::to_string(&record)?)
}

/// Line as the previous storefront stored it.
#[derive(Deserialize)]
struct PreviousLine {
    id: String,
    title: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    slug: String,
    price: f64,
    quantity: f64,
}

#[derive(Deserialize)]
struct PreviousCart {
    items: Vec<PreviousLine>,
}

fn corrupt(err: impl std::fmt::Display) -> StoreError {
    StoreError::CorruptRecord(err.to_string())
}

fn is_previous_storefront(value: &serde_json::Value) -> bool {
    value.get("version").is_none() && value.get("total").is_some()
}

/// Rounds a major-unit float price to cents.
fn price_to_money(price: f64) -> Option<Money> {
    let cents = (price * 100.0).round();
    (cents.is_finite() && cents >= 0.0 && cents < i64::MAX as f64)
        .then(|| Money::from_cents(cents as i64))
}

/// Whole units; anything below one becomes 0 and is dropped by repair.
fn float_quantity(quantity: f64) -> u32 {
    if quantity.is_nan() || quantity < 1.0 {
        0
    } else if quantity >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        quantity as u32
    }
}

fn upgrade_previous_storefront(value: serde_json::Value) -> StoreResult<StoredCart> {
    let previous: PreviousCart = serde_json::from_value(value).map_err(corrupt)?;

    let items = previous
        .items
        .into_iter()
        .map(|line| {
            let unit_price = price_to_money(line.price)
                .ok_or_else(|| corrupt(format!("price {} of '{}' out of range", line.price, line.id)))?;
            Ok(CartLineItem {
                id: line.id,
                title: line.title,
                image: line.image,
                slug: line.slug,
                unit_price,
                quantity: float_quantity(line.quantity),
            })
        })
        .collect::<StoreResult<Vec<_>>>()?;

    Ok(StoredCart {
        version: 0,
        saved_at: None,
        cart: CartState::from_items(items).map_err(corrupt)?,
    })
}

/// Parses a stored record, keeping its envelope.
pub fn decode_record(raw: &str) -> StoreResult<StoredCart> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(corrupt)?;
    if is_previous_storefront(&value) {
        return upgrade_previous_storefront(value);
    }

    let record: StoredCart = serde_json::from_value(value).map_err(corrupt)?;

    if record.version > RECORD_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: record.version,
            supported: RECORD_VERSION,
        });
    }

    Ok(record)
}

/// Parses a stored record down to the cart it holds.
///
/// ## Errors
/// * `CorruptRecord` - not JSON, or not shaped like a cart
/// * `UnsupportedVersion` - written by a newer release
pub fn decode_cart(raw: &str) -> StoreResult<CartState> {
    decode_record(raw).map(|record| record.cart)
}
