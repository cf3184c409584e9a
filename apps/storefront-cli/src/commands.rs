//! # Cart Commands
//!
//! One function per subcommand, each acting on a [`CartHandle`].
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  storefront add --id 1 --title "Tech T-Shirt" --price "$29.99 USD"     │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  CatalogEntry ──► to_cart_product() ──► parse "$29.99 USD" → 2999¢     │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  cart.add_to_cart(product)  (qty+1 if already in cart, price frozen)   │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  CartResponse::from(&cart.state()) ──► printed as table or JSON        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt::Write as _;

use serde::Serialize;
use tracing::debug;

use storefront_core::{CartLineItem, CartState, CartTotals, CatalogEntry};
use storefront_session::{CartHandle, StorefrontConfig};

use crate::error::CliResult;

/// Cart contents plus totals, as printed by every command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartLineItem>,
    pub totals: CartTotals,
}

impl From<&CartState> for CartResponse {
    fn from(cart: &CartState) -> Self {
        CartResponse {
            items: cart.items().to_vec(),
            totals: cart.totals(),
        }
    }
}

impl CartResponse {
    /// Plain-text rendering with the configured currency.
    pub fn render(&self, config: &StorefrontConfig) -> String {
        let mut out = String::new();
        if self.items.is_empty() {
            out.push_str("Cart is empty\n");
            return out;
        }

        for line in &self.items {
            let total = line
                .line_total()
                .map(|total| config.format_currency(total))
                .unwrap_or_else(|| "overflow".to_string());
            let _ = writeln!(out, "{:<24} x{:<4} {:>12}", line.title, line.quantity, total);
        }
        let _ = writeln!(out, "{}", "-".repeat(43));
        let _ = writeln!(
            out,
            "{:<24} {:<5} {:>12}",
            "Subtotal",
            self.totals.item_count,
            config.format_currency(self.totals.subtotal)
        );
        out
    }
}

/// Adds one unit of a catalog product.
pub fn add(cart: &CartHandle, entry: &CatalogEntry) -> CliResult<CartResponse> {
    debug!(product_id = %entry.id, price = %entry.price, "add command");
    let product = entry.to_cart_product()?;
    cart.add_to_cart(product);
    Ok(show(cart))
}

pub fn remove(cart: &CartHandle, id: &str) -> CartResponse {
    debug!(product_id = %id, "remove command");
    cart.remove_from_cart(id);
    show(cart)
}

/// Sets a line's quantity; zero or less removes it.
pub fn update(cart: &CartHandle, id: &str, quantity: i64) -> CartResponse {
    debug!(product_id = %id, quantity, "update command");
    cart.update_quantity(id, quantity);
    show(cart)
}

pub fn clear(cart: &CartHandle) -> CartResponse {
    debug!("clear command");
    cart.clear_cart();
    show(cart)
}

pub fn show(cart: &CartHandle) -> CartResponse {
    CartResponse::from(&cart.state())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::CoreError;
    use storefront_session::{CartSession, SessionOptions};
    use storefront_store::MemoryStore;

    fn entry(id: &str, title: &str, price: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            title: title.to_string(),
            price: price.to_string(),
            image: String::new(),
            slug: String::new(),
        }
    }

    #[tokio::test]
    async fn test_command_sequence() {
        let session = CartSession::open(MemoryStore::new(), SessionOptions::default()).await;
        let cart = session.handle();

        add(&cart, &entry("A", "Hoodie", "$10.00 USD")).unwrap();
        add(&cart, &entry("B", "Cap", "$5.00")).unwrap();
        add(&cart, &entry("A", "Hoodie", "$10.00 USD")).unwrap();
        let response = update(&cart, "B", 3);

        assert_eq!(response.totals.subtotal.cents(), 3500);
        assert_eq!(response.totals.item_count, 5);
        assert_eq!(response.items.len(), 2);

        let response = remove(&cart, "missing");
        assert_eq!(response.totals.item_count, 5);

        let response = clear(&cart);
        assert!(response.items.is_empty());
        session.close().await;
    }

    #[tokio::test]
    async fn test_bad_price_is_rejected() {
        let session = CartSession::open(MemoryStore::new(), SessionOptions::default()).await;
        let cart = session.handle();

        let err = add(&cart, &entry("A", "Hoodie", "free")).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CliError::InvalidInput(CoreError::InvalidCatalogEntry { .. })
        ));
        assert_eq!(err.exit_code(), 2);
        assert!(cart.state().is_empty());
        session.close().await;
    }

    #[test]
    fn test_render() {
        let config = StorefrontConfig::default();
        let empty = CartResponse::from(&CartState::new());
        assert_eq!(empty.render(&config), "Cart is empty\n");

        let cart = CartHandle::inert();
        assert_eq!(show(&cart).render(&config), "Cart is empty\n");
    }

    #[tokio::test]
    async fn test_render_lines() {
        let session = CartSession::open(MemoryStore::new(), SessionOptions::default()).await;
        let cart = session.handle();
        add(&cart, &entry("1", "Tech T-Shirt", "$29.99 USD")).unwrap();
        let response = add(&cart, &entry("1", "Tech T-Shirt", "$29.99 USD")).unwrap();

        let text = response.render(&StorefrontConfig::default());
        assert!(text.contains("Tech T-Shirt"));
        assert!(text.contains("$59.98"));
        session.close().await;
    }
}
