//! # Cart State Engine
//!
//! The cart as a value, and the single pure function that moves it forward.
//!
//! ## Transition Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Transitions                               │
//! │                                                                         │
//! │  View Action             CartAction                State Change         │
//! │  ───────────             ──────────                ────────────         │
//! │                                                                         │
//! │  Add to cart ──────────► AddItem ────────────────► qty+1 or append     │
//! │                                                                         │
//! │  Change quantity ──────► UpdateQuantity ─────────► qty = n (≤0 → drop) │
//! │                                                                         │
//! │  Click remove ─────────► RemoveItem ─────────────► line deleted        │
//! │                                                                         │
//! │  Empty cart ───────────► ClearCart ──────────────► empty state         │
//! │                                                                         │
//! │  (session start) ──────► LoadSnapshot ───────────► replaced verbatim   │
//! │                                                                         │
//! │  apply(state, action) → state'   NEVER fails, NEVER performs I/O       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `subtotal` and `item_count` equal the sums over `items`
//! - line ids are unique
//! - every line has `quantity >= 1`
//!
//! Every action except `LoadSnapshot` preserves all of them. `LoadSnapshot`
//! trusts its input; the session decides whether to repair it first
//! (see [`crate::validation::repair_snapshot`]).
//!
//! Amounts never overflow: a change whose line total or subtotal would not
//! fit in [`Money`] is ignored, the same way an add past `u32::MAX` is.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartLineItem, CartProduct};
use crate::validation;

// =============================================================================
// Cart State
// =============================================================================

/// The aggregate the transition engine owns.
///
/// Fields are private: only [`apply`] changes a cart, so the aggregates
/// cannot drift from the lines through outside mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartState {
    /// Lines in first-added order.
    items: Vec<CartLineItem>,

    /// Σ unit_price × quantity.
    subtotal: Money,

    /// Σ quantity.
    item_count: u64,
}

impl CartState {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from lines, deriving both aggregates.
    ///
    /// ## Errors
    /// * `InconsistentSnapshot` - the line totals do not fit in [`Money`]
    pub fn from_items(items: Vec<CartLineItem>) -> CoreResult<Self> {
        let mut state = CartState {
            items,
            subtotal: Money::zero(),
            item_count: 0,
        };
        state.recompute_totals()?;
        Ok(state)
    }

    // =========================================================================
    // Derived Accessors
    // =========================================================================

    /// Lines in the order they were first added.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Total quantity across all lines (what the cart badge shows).
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks up a line by product id.
    pub fn line(&self, id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|line| line.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.line(id).is_some()
    }

    /// Summary for badge and drawer footers.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }

    /// Checks the invariants, reporting the first violation found.
    pub fn check_invariants(&self) -> CoreResult<()> {
        validation::validate_snapshot(self).map_err(CoreError::InconsistentSnapshot)
    }

    /// Sets `subtotal` and `item_count` from the lines.
    ///
    /// Leaves the cart untouched when the sums overflow.
    pub fn recompute_totals(&mut self) -> CoreResult<()> {
        let (subtotal, item_count) =
            validation::line_sums(&self.items).map_err(CoreError::InconsistentSnapshot)?;
        self.subtotal = subtotal;
        self.item_count = item_count;
        Ok(())
    }

    /// Consuming form of [`recompute_totals`](Self::recompute_totals).
    pub fn recomputed(mut self) -> CoreResult<Self> {
        self.recompute_totals()?;
        Ok(self)
    }

    /// Mutable access for snapshot repair inside this crate.
    pub(crate) fn items_mut(&mut self) -> &mut Vec<CartLineItem> {
        &mut self.items
    }

    // =========================================================================
    // Transitions (private, reached only through `apply`)
    // =========================================================================

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|line| line.id == id)
    }

    /// Adds one unit. An existing line keeps its frozen unit price, so the
    /// subtotal moves by that price rather than `base_price`.
    fn add_item(&mut self, product: CartProduct, base_price: Money) {
        if let Some(pos) = self.position(&product.id) {
            let line = &mut self.items[pos];
            if line.quantity == u32::MAX {
                return;
            }
            let Some(subtotal) = self.subtotal.checked_add(line.unit_price) else {
                return;
            };
            line.quantity += 1;
            self.subtotal = subtotal;
            self.item_count = self.item_count.saturating_add(1);
            return;
        }

        let unit_price = base_price.max(Money::zero());
        let Some(subtotal) = self.subtotal.checked_add(unit_price) else {
            return;
        };
        self.items.push(CartLineItem::open(product, unit_price));
        self.subtotal = subtotal;
        self.item_count = self.item_count.saturating_add(1);
    }

    fn remove_item(&mut self, id: &str) {
        let Some(pos) = self.position(id) else {
            return;
        };
        let line = self.items.remove(pos);
        self.item_count = self.item_count.saturating_sub(u64::from(line.quantity));

        match line.line_total().and_then(|total| self.subtotal.checked_sub(total)) {
            Some(subtotal) => self.subtotal = subtotal,
            // only a trusted snapshot with out-of-range totals gets here
            None => {
                let _ = self.recompute_totals();
            }
        }
    }

    fn update_quantity(&mut self, id: &str, quantity: i64) {
        let Some(pos) = self.position(id) else {
            return;
        };
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }

        let new_qty = u32::try_from(quantity).unwrap_or(u32::MAX);
        let line = &self.items[pos];
        let old_qty = line.quantity;

        let subtotal = line
            .line_total()
            .and_then(|old_total| self.subtotal.checked_sub(old_total))
            .zip(line.unit_price.checked_mul_quantity(i64::from(new_qty)))
            .and_then(|(rest, new_total)| rest.checked_add(new_total));
        let Some(subtotal) = subtotal else {
            return;
        };

        self.items[pos].quantity = new_qty;
        self.subtotal = subtotal;
        if new_qty >= old_qty {
            self.item_count = self.item_count.saturating_add(u64::from(new_qty - old_qty));
        } else {
            self.item_count = self.item_count.saturating_sub(u64::from(old_qty - new_qty));
        }
    }
}

// =============================================================================
// Cart Action
// =============================================================================

/// Everything that can happen to a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit of `item`; a new line is opened at `base_price`.
    AddItem { item: CartProduct, base_price: Money },

    /// Delete the line with this id. Absent id → no-op.
    RemoveItem { id: String },

    /// Set a line's quantity. Absent id → no-op, `quantity <= 0` → removal.
    UpdateQuantity { id: String, quantity: i64 },

    /// Empty the cart.
    ClearCart,

    /// Replace the whole state (hydration only).
    LoadSnapshot(CartState),
}

impl CartAction {
    /// AddItem priced at the product's own unit price.
    pub fn add(item: CartProduct) -> Self {
        let base_price = item.unit_price;
        CartAction::AddItem { item, base_price }
    }

    pub fn remove(id: impl Into<String>) -> Self {
        CartAction::RemoveItem { id: id.into() }
    }

    pub fn update_quantity(id: impl Into<String>, quantity: i64) -> Self {
        CartAction::UpdateQuantity {
            id: id.into(),
            quantity,
        }
    }

    /// Short name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CartAction::AddItem { .. } => "add_item",
            CartAction::RemoveItem { .. } => "remove_item",
            CartAction::UpdateQuantity { .. } => "update_quantity",
            CartAction::ClearCart => "clear_cart",
            CartAction::LoadSnapshot(_) => "load_snapshot",
        }
    }
}

// =============================================================================
// Transition Function
// =============================================================================

/// Applies one action, returning the next state.
///
/// Total over [`CartAction`]: no action is rejected. Takes the state by
/// value; callers holding a shared snapshot clone it first, so published
/// snapshots are never changed in place.
///
/// ## Example
/// ```rust
/// use storefront_core::{apply, CartAction, CartProduct, CartState, Money};
///
/// let a = CartProduct::new("A", "Hoodie", Money::from_cents(1000));
/// let b = CartProduct::new("B", "Cap", Money::from_cents(500));
///
/// let s = [
///     CartAction::add(a.clone()),
///     CartAction::add(b),
///     CartAction::add(a),
///     CartAction::update_quantity("B", 3),
/// ]
/// .into_iter()
/// .fold(CartState::new(), apply);
///
/// assert_eq!(s.subtotal().cents(), 3500);
/// assert_eq!(s.item_count(), 5);
/// ```
pub fn apply(mut state: CartState, action: CartAction) -> CartState {
    match action {
        CartAction::AddItem { item, base_price } => state.add_item(item, base_price),
        CartAction::RemoveItem { id } => state.remove_item(&id),
        CartAction::UpdateQuantity { id, quantity } => state.update_quantity(&id, quantity),
        CartAction::ClearCart => return CartState::new(),
        CartAction::LoadSnapshot(snapshot) => return snapshot,
    }
    state
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart totals summary for badge/drawer consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub item_count: u64,
    pub subtotal: Money,
}

impl From<&CartState> for CartTotals {
    fn from(cart: &CartState) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            item_count: cart.item_count(),
            subtotal: cart.subtotal(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64) -> CartProduct {
        CartProduct::new(id, format!("Product {}", id), Money::from_cents(cents))
    }

    fn run(actions: Vec<CartAction>) -> CartState {
        actions.into_iter().fold(CartState::new(), apply)
    }

    fn assert_consistent(state: &CartState) {
        let subtotal: i64 = state
            .items()
            .iter()
            .map(|l| l.unit_price.cents() * i64::from(l.quantity))
            .sum();
        let count: u64 = state.items().iter().map(|l| u64::from(l.quantity)).sum();
        assert_eq!(state.subtotal().cents(), subtotal);
        assert_eq!(state.item_count(), count);
        assert!(state.items().iter().all(|l| l.quantity >= 1));
        let mut ids: Vec<&str> = state.items().iter().map(|l| l.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), state.line_count());
    }

    #[test]
    fn test_checkout_scenario() {
        let state = run(vec![
            CartAction::add(product("A", 1000)),
            CartAction::add(product("B", 500)),
            CartAction::add(product("A", 1000)),
            CartAction::update_quantity("B", 3),
        ]);

        let lines: Vec<(&str, u32)> = state
            .items()
            .iter()
            .map(|l| (l.id.as_str(), l.quantity))
            .collect();
        assert_eq!(lines, vec![("A", 2), ("B", 3)]);
        assert_eq!(state.subtotal().cents(), 3500);
        assert_eq!(state.item_count(), 5);
    }

    #[test]
    fn test_add_same_product_increments_instead_of_duplicating() {
        let state = run(vec![
            CartAction::add(product("A", 1000)),
            CartAction::add(product("A", 1000)),
        ]);

        assert_eq!(state.line_count(), 1);
        assert_eq!(state.line("A").map(|l| l.quantity), Some(2));
        assert_eq!(state.subtotal().cents(), 2000);
    }

    #[test]
    fn test_new_lines_keep_insertion_order() {
        let state = run(vec![
            CartAction::add(product("C", 100)),
            CartAction::add(product("A", 100)),
            CartAction::add(product("B", 100)),
            CartAction::add(product("A", 100)),
        ]);

        let ids: Vec<&str> = state.items().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_repeat_add_uses_frozen_price() {
        let state = run(vec![
            CartAction::add(product("A", 1000)),
            CartAction::AddItem {
                item: product("A", 1200),
                base_price: Money::from_cents(1200),
            },
        ]);

        assert_eq!(state.line("A").map(|l| l.unit_price.cents()), Some(1000));
        assert_eq!(state.subtotal().cents(), 2000);
        assert_consistent(&state);
    }

    #[test]
    fn test_negative_base_price_opens_free_line() {
        let state = run(vec![CartAction::AddItem {
            item: product("A", 0),
            base_price: Money::from_cents(-300),
        }]);

        assert_eq!(state.subtotal().cents(), 0);
        assert_eq!(state.item_count(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let state = run(vec![
            CartAction::add(product("A", 1000)),
            CartAction::add(product("B", 500)),
        ]);

        let after = apply(state.clone(), CartAction::remove("missing"));
        assert_eq!(after, state);
    }

    #[test]
    fn test_remove_present_line() {
        let state = run(vec![
            CartAction::add(product("A", 1000)),
            CartAction::add(product("A", 1000)),
            CartAction::add(product("B", 500)),
            CartAction::remove("A"),
        ]);

        assert!(!state.contains("A"));
        assert_eq!(state.subtotal().cents(), 500);
        assert_eq!(state.item_count(), 1);
    }

    #[test]
    fn test_update_to_zero_matches_remove() {
        let state = run(vec![
            CartAction::add(product("A", 1000)),
            CartAction::add(product("B", 500)),
            CartAction::update_quantity("B", 4),
        ]);

        for id in ["A", "B"] {
            let removed = apply(state.clone(), CartAction::remove(id));
            let zeroed = apply(state.clone(), CartAction::update_quantity(id, 0));
            let negative = apply(state.clone(), CartAction::update_quantity(id, -7));
            assert_eq!(zeroed, removed);
            assert_eq!(negative, removed);
        }
    }

    #[test]
    fn test_update_absent_is_noop() {
        let state = run(vec![CartAction::add(product("A", 1000))]);

        assert_eq!(apply(state.clone(), CartAction::update_quantity("Z", 5)), state);
        assert_eq!(apply(state.clone(), CartAction::update_quantity("Z", 0)), state);
    }

    #[test]
    fn test_update_down_adjusts_totals() {
        let state = run(vec![
            CartAction::add(product("A", 250)),
            CartAction::update_quantity("A", 8),
            CartAction::update_quantity("A", 3),
        ]);

        assert_eq!(state.item_count(), 3);
        assert_eq!(state.subtotal().cents(), 750);
    }

    #[test]
    fn test_huge_quantity_saturates() {
        let state = run(vec![
            CartAction::add(product("A", 1)),
            CartAction::update_quantity("A", i64::MAX),
        ]);

        assert_eq!(state.line("A").map(|l| l.quantity), Some(u32::MAX));
        assert_consistent(&state);

        let again = apply(state.clone(), CartAction::add(product("A", 1)));
        assert_eq!(again, state);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let state = run(vec![
            CartAction::add(product("A", 1000)),
            CartAction::add(product("B", 500)),
        ]);

        let once = apply(state, CartAction::ClearCart);
        let twice = apply(once.clone(), CartAction::ClearCart);
        assert_eq!(once, CartState::new());
        assert_eq!(twice, CartState::new());
    }

    #[test]
    fn test_load_snapshot_replaces_verbatim() {
        let current = run(vec![CartAction::add(product("A", 1000))]);
        let snapshot: CartState = serde_json::from_str(
            r#"{"items":[{"id":"X","title":"X","unitPrice":100,"quantity":2}],"subtotal":999,"itemCount":2}"#,
        )
        .unwrap();

        let loaded = apply(current, CartAction::LoadSnapshot(snapshot.clone()));
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.subtotal().cents(), 999);
        assert!(loaded.check_invariants().is_err());

        let fixed = loaded.recomputed().unwrap();
        assert_eq!(fixed.subtotal().cents(), 200);
        assert!(fixed.check_invariants().is_ok());
    }

    /// Walks a fixed pseudo-random action sequence and checks the
    /// invariants after every step.
    #[test]
    fn test_invariants_hold_over_mixed_sequence() {
        let ids = ["A", "B", "C", "D"];
        let prices = [1000, 500, 1999, 1];
        let mut seed: u64 = 0x5eed;
        let mut state = CartState::new();

        for _ in 0..2_000 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let pick = (seed >> 33) as usize;
            let i = pick % ids.len();
            let action = match (pick / 7) % 10 {
                0..=4 => CartAction::add(product(ids[i], prices[i])),
                5 | 6 => CartAction::update_quantity(ids[i], (pick % 9) as i64 - 2),
                7 | 8 => CartAction::remove(ids[i]),
                _ => CartAction::ClearCart,
            };
            state = apply(state, action);
            assert_consistent(&state);
            assert!(state.check_invariants().is_ok());
        }
    }

    #[test]
    fn test_totals_summary() {
        let state = run(vec![
            CartAction::add(product("A", 1000)),
            CartAction::add(product("B", 500)),
            CartAction::update_quantity("B", 3),
        ]);

        let totals = state.totals();
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.item_count, 4);
        assert_eq!(totals.subtotal.cents(), 2500);
    }

    #[test]
    fn test_from_items_derives_totals() {
        let mut a = CartLineItem::open(product("A", 1000), Money::from_cents(1000));
        a.quantity = 2;
        let b = CartLineItem::open(product("B", 500), Money::from_cents(500));

        let state = CartState::from_items(vec![a, b]).unwrap();
        assert_eq!(state.subtotal().cents(), 2500);
        assert_eq!(state.item_count(), 3);
    }

    #[test]
    fn test_from_items_rejects_overflowing_lines() {
        let mut a = CartLineItem::open(product("A", i64::MAX), Money::from_cents(i64::MAX));
        a.quantity = 2;

        let err = CartState::from_items(vec![a]).unwrap_err();
        assert!(matches!(err, CoreError::InconsistentSnapshot(_)));
    }

    #[test]
    fn test_update_past_money_range_is_noop() {
        let state = run(vec![CartAction::add(product("A", 3_000_000_000))]);

        let after = apply(state.clone(), CartAction::update_quantity("A", 4_000_000_000));
        assert_eq!(after, state);

        let grown = apply(state, CartAction::update_quantity("A", 3_000_000_000));
        assert_eq!(grown.line("A").map(|l| l.quantity), Some(3_000_000_000));
        assert_eq!(grown.subtotal().cents(), 9_000_000_000_000_000_000);
        assert_consistent(&grown);
    }

    #[test]
    fn test_add_past_money_range_is_noop() {
        let state = run(vec![CartAction::add(product("A", i64::MAX))]);

        let repeat = apply(state.clone(), CartAction::add(product("A", i64::MAX)));
        assert_eq!(repeat, state);

        let other = apply(state.clone(), CartAction::add(product("B", 1)));
        assert_eq!(other, state);
        assert!(!other.contains("B"));

        let removed = apply(state, CartAction::remove("A"));
        assert_eq!(removed, CartState::new());
    }

    #[test]
    fn test_trusted_overflowing_snapshot_stays_usable() {
        let snapshot: CartState = serde_json::from_str(
            r#"{"items":[
                {"id":"A","title":"A","unitPrice":9223372036854775807,"quantity":2},
                {"id":"B","title":"B","unitPrice":100,"quantity":1}
            ],"subtotal":0,"itemCount":3}"#,
        )
        .unwrap();
        let loaded = apply(CartState::new(), CartAction::LoadSnapshot(snapshot));

        let updated = apply(loaded.clone(), CartAction::update_quantity("A", 3));
        assert_eq!(updated, loaded);

        let removed = apply(loaded, CartAction::remove("A"));
        assert_eq!(removed.line_count(), 1);
        assert_eq!(removed.subtotal().cents(), 100);
        assert_eq!(removed.item_count(), 1);
    }

    #[test]
    fn test_state_json_shape() {
        let state = run(vec![CartAction::add(product("A", 1000))]);
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["subtotal"], 1000);
        assert_eq!(json["itemCount"], 1);
        assert_eq!(json["items"][0]["id"], "A");
    }
}
