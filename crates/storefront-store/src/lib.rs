//! # storefront-store: Durable Storage for the Storefront Cart
//!
//! This crate provides the durable key-value slot the cart is mirrored into.
//! It plays the role browser-local storage plays for a web storefront: one
//! string value per key, surviving across sessions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Cart Data Flow                        │
//! │                                                                         │
//! │  Persistence synchronizer (storefront-session)                         │
//! │       │  get(key) at hydration, set(key, json) on write-through         │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-store (THIS CRATE)                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ KeyValueStore │    │  StoreBackend │    │    record    │  │   │
//! │  │   │   (kv.rs)     │    │  Sqlite       │    │ encode_cart  │  │   │
//! │  │   │ get/set/remove│◄───│  Memory       │    │ decode_cart  │  │   │
//! │  │   │               │    │  Disabled     │    │ (versioned)  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   kv_store(key, value, updated_at)                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`kv`] - The `KeyValueStore` trait and the memory/disabled backends
//! - [`pool`] - SQLite pool creation and the SQLite backend
//! - [`migrations`] - Embedded database migrations
//! - [`record`] - Stored cart record format
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_store::{KeyValueStore, SqliteStore, StoreConfig};
//!
//! let store = SqliteStore::new(StoreConfig::new("./storefront.db")).await?;
//! store.set("outside-zone-cart", "{}").await?;
//! let raw = store.get("outside-zone-cart").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod kv;
pub mod migrations;
pub mod pool;
pub mod record;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use kv::{DisabledStore, KeyValueStore, MemoryStore, StoreBackend};
pub use pool::{SqliteStore, StoreConfig};
pub use record::{decode_cart, decode_record, encode_cart, StoredCart, RECORD_VERSION};
