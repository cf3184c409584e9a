//! # Validation Module
//!
//! Checks for data that enters the cart from outside: stored snapshots and
//! catalog prices.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Outside Data Enters                          │
//! │                                                                         │
//! │  Catalog display price "$29.99 USD"                                    │
//! │  └── parse_display_price() ──► Money (or ValidationError)              │
//! │                                                                         │
//! │  Stored snapshot (durable storage)                                     │
//! │  ├── validate_snapshot()  ──► first invariant violation, if any        │
//! │  └── repair_snapshot()    ──► consistent CartState, unless it overflows│
//! │                                                                         │
//! │  Cart actions themselves need no validation: every action is total.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};

use crate::cart::CartState;
use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::CartLineItem;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a product id used as a line key.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_product_id;
///
/// assert!(validate_product_id("gid://shopify/Product/1").is_ok());
/// assert!(validate_product_id("   ").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }
    Ok(())
}

/// Parses a display price such as `"$29.99 USD"`, `"29.9"` or `"1,299.00"`
/// into [`Money`].
///
/// ## Rules
/// - Currency symbols, codes and thousands separators are ignored
/// - At most two fractional digits
/// - Must not be negative
///
/// ## Example
/// ```rust
/// use storefront_core::validation::parse_display_price;
///
/// assert_eq!(parse_display_price("$29.99 USD").unwrap().cents(), 2999);
/// assert_eq!(parse_display_price("45").unwrap().cents(), 4500);
/// assert!(parse_display_price("Sold out").is_err());
/// ```
pub fn parse_display_price(display: &str) -> ValidationResult<Money> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "price".to_string(),
        reason: reason.to_string(),
    };

    if display.contains('-') {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    let numeric: String = display
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if numeric.is_empty() {
        return Err(invalid("no amount found"));
    }

    let (major, minor) = match numeric.split_once('.') {
        Some((major, minor)) => (major, minor),
        None => (numeric.as_str(), ""),
    };
    if minor.contains('.') {
        return Err(invalid("more than one decimal point"));
    }
    if minor.len() > 2 {
        return Err(invalid("more than two decimal places"));
    }

    let major: i64 = if major.is_empty() {
        0
    } else {
        major.parse().map_err(|_| invalid("amount too large"))?
    };
    let minor: i64 = match minor.len() {
        0 => 0,
        1 => minor.parse::<i64>().map_err(|_| invalid("bad cents"))? * 10,
        _ => minor.parse().map_err(|_| invalid("bad cents"))?,
    };

    let cents = major
        .checked_mul(100)
        .and_then(|c| c.checked_add(minor))
        .ok_or_else(|| invalid("amount too large"))?;
    Ok(Money::from_cents(cents))
}

// =============================================================================
// Snapshot Validators
// =============================================================================

/// Σ line totals and Σ quantities, or `Overflow` if either does not fit.
pub(crate) fn line_sums(items: &[CartLineItem]) -> ValidationResult<(Money, u64)> {
    let overflow = |field: &str| ValidationError::Overflow {
        field: field.to_string(),
    };

    let subtotal = items
        .iter()
        .map(CartLineItem::line_total)
        .try_fold(Money::zero(), |total, line| total.checked_add(line?))
        .ok_or_else(|| overflow("subtotal"))?;
    let item_count = items
        .iter()
        .try_fold(0u64, |count, line| count.checked_add(u64::from(line.quantity)))
        .ok_or_else(|| overflow("itemCount"))?;

    Ok((subtotal, item_count))
}

/// Checks the cart invariants on a snapshot.
///
/// ## Checks (in order)
/// 1. No line has quantity 0
/// 2. No two lines share an id
/// 3. Line totals add up without overflowing
/// 4. `subtotal` equals Σ line totals
/// 5. `item_count` equals Σ quantities
pub fn validate_snapshot(state: &CartState) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(state.line_count());

    for line in state.items() {
        if line.quantity == 0 {
            return Err(ValidationError::MustBePositive {
                field: format!("quantity of '{}'", line.id),
            });
        }
        if !seen.insert(line.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "line id".to_string(),
                value: line.id.clone(),
            });
        }
    }

    let (derived_subtotal, derived_count) = line_sums(state.items())?;
    if derived_subtotal != state.subtotal() {
        return Err(ValidationError::Mismatch {
            field: "subtotal".to_string(),
            stored: state.subtotal().cents(),
            derived: derived_subtotal.cents(),
        });
    }

    if derived_count != state.item_count() {
        return Err(ValidationError::Mismatch {
            field: "itemCount".to_string(),
            stored: i64::try_from(state.item_count()).unwrap_or(i64::MAX),
            derived: i64::try_from(derived_count).unwrap_or(i64::MAX),
        });
    }

    Ok(())
}

/// Returns a snapshot that satisfies the cart invariants.
///
/// ## Repairs
/// - Duplicate ids merge into the first occurrence (quantities summed, first
///   line's price kept)
/// - Zero-quantity lines are dropped
/// - Negative unit prices become zero
/// - `subtotal` and `item_count` are recomputed from the remaining lines
///
/// A consistent snapshot comes back unchanged.
///
/// ## Errors
/// * `InconsistentSnapshot` - the repaired lines still overflow [`Money`];
///   such a snapshot cannot be made consistent and should be discarded
pub fn repair_snapshot(mut state: CartState) -> CoreResult<CartState> {
    let lines = std::mem::take(state.items_mut());
    let mut merged: Vec<CartLineItem> = Vec::with_capacity(lines.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(lines.len());

    for mut line in lines {
        if line.quantity == 0 {
            continue;
        }
        if line.unit_price.is_negative() {
            line.unit_price = Money::zero();
        }
        match index.get(&line.id) {
            Some(&pos) => {
                let first = &mut merged[pos];
                first.quantity = first.quantity.saturating_add(line.quantity);
            }
            None => {
                index.insert(line.id.clone(), merged.len());
                merged.push(line);
            }
        }
    }

    *state.items_mut() = merged;
    state.recompute_totals()?;
    Ok(state)
}

// =============================================================================
// Unit Tests
// =============================================================================
