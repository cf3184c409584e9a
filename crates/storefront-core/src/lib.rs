//! # storefront-core: Pure Cart Logic for the Storefront
//!
//! This crate is the **heart** of the storefront cart. It contains the cart
//! state transition engine as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Cart Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront Views                             │   │
//! │  │    Cart Badge ──► Cart Drawer ──► Line-Item Controls           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartHandle                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               storefront-session (facade + sync)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ apply(state, action)                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ storefront-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │ LineItem  │  │   Money   │  │ CartState │  │ snapshot  │  │   │
//! │  │   │ Product   │  │           │  │ CartAction│  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Line items and the products the catalog hands to the cart
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart state, actions and the transition function
//! - [`catalog`] - Adapter from catalog display data to cart products
//! - [`validation`] - Snapshot invariant checks and repair
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::{apply, CartAction, CartProduct, CartState, Money};
//!
//! let tee = CartProduct::new("1", "Tech T-Shirt", Money::from_cents(2999));
//!
//! let state = apply(CartState::default(), CartAction::add(tee.clone()));
//! let state = apply(state, CartAction::add(tee));
//!
//! assert_eq!(state.items().len(), 1);
//! assert_eq!(state.item_count(), 2);
//! assert_eq!(state.subtotal().cents(), 5998);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{apply, CartAction, CartState, CartTotals};
pub use catalog::CatalogEntry;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::{CartLineItem, CartProduct};
