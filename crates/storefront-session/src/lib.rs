//! # storefront-session: Cart Session and Persistence
//!
//! Holds the live cart for a storefront session and keeps it in step with
//! durable storage.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Session Flow                                │
//! │                                                                         │
//! │  StorefrontConfig::load_or_default(None)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  config.open_backend().await ──► StoreBackend (sqlite|memory|disabled) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartSession::start ──► handle() usable, not ready                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  hydrate().await ──► stored cart loaded, queued actions replayed,      │
//! │       │              ready, write-through on                            │
//! │       ▼                                                                 │
//! │  CartHandle: add_to_cart / remove_from_cart / update_quantity /        │
//! │              clear_cart / state / subscribe / totals                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  close().await ──► final write, writer stopped                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`session`] - `CartSession` and the `CartHandle` facade
//! - [`synchronizer`] - Hydration and the write-through task
//! - [`config`] - `StorefrontConfig` (TOML + environment)
//! - [`error`] - Session setup errors

pub mod config;
pub mod error;
pub mod session;
pub mod synchronizer;

pub use config::{CurrencySettings, StorageKind, StorageSettings, StorefrontConfig, DEFAULT_CART_KEY};
pub use error::{SessionError, SessionResult};
pub use session::{CartHandle, CartSession, SessionOptions};
pub use synchronizer::HydrationOutcome;
