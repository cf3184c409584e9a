//! # Key-Value Slots
//!
//! The storage abstraction the persistence synchronizer talks to.
//!
//! ## Backends
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    KeyValueStore Implementations                        │
//! │                                                                         │
//! │  SqliteStore   (pool.rs)  durable, survives restarts                   │
//! │  MemoryStore   (here)     per-process, shareable clone, can be         │
//! │                           switched off to simulate unavailable storage │
//! │  DisabledStore (here)     storage capability absent: reads nothing,    │
//! │                           writes nowhere, never fails                  │
//! │                                                                         │
//! │  StoreBackend             one of the above, picked from configuration  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::pool::SqliteStore;

// =============================================================================
// Trait
// =============================================================================

/// A durable slot store addressed by string keys.
///
/// Values are opaque strings; the cart record format lives in
/// [`crate::record`].
pub trait KeyValueStore: Send + Sync + 'static {
    /// Reads the value under `key`, `None` if nothing was stored.
    fn get(&self, key: &str) -> impl Future<Output = StoreResult<Option<String>>> + Send;

    /// Stores `value` under `key`, replacing any prior value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = StoreResult<()>> + Send;

    /// Deletes the value under `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = StoreResult<()>> + Send;
}

// =============================================================================
// Memory Store
// =============================================================================

#[derive(Debug, Default)]
struct MemoryInner {
    slots: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
    writes: AtomicUsize,
}

/// In-process store. Clones share the same slots.
///
/// ## Usage
/// ```rust,ignore
/// let store = MemoryStore::new();
/// let observer = store.clone();       // keep a handle for assertions
/// run_session(store).await;
/// assert_eq!(observer.write_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `value` under `key`.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let slots = HashMap::from([(key.into(), value.into())]);
        MemoryStore {
            inner: Arc::new(MemoryInner {
                slots: Mutex::new(slots),
                ..MemoryInner::default()
            }),
        }
    }

    /// Makes every following operation fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_available()?;
        Ok(self.inner.slots.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check_available()?;
        self.inner
            .slots
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        trace!(key, bytes = value.len(), "memory store write");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.check_available()?;
        self.inner.slots.lock().await.remove(key);
        Ok(())
    }
}

// =============================================================================
// Disabled Store
// =============================================================================

/// Stand-in used when durable storage is not available in this environment.
///
/// Reads find nothing and writes succeed without effect, so the session
/// runs memory-only without branching on the environment anywhere else.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStore;

impl KeyValueStore for DisabledStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> StoreResult<()> {
        Ok(())
    }
}

// =============================================================================
// Store Backend
// =============================================================================

/// The backend chosen at startup.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    Sqlite(SqliteStore),
    Memory(MemoryStore),
    Disabled(DisabledStore),
}

impl StoreBackend {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Sqlite(_) => "sqlite",
            StoreBackend::Memory(_) => "memory",
            StoreBackend::Disabled(_) => "disabled",
        }
    }

    /// True when writes actually reach some storage.
    pub fn is_persistent(&self) -> bool {
        !matches!(self, StoreBackend::Disabled(_))
    }
}

impl KeyValueStore for StoreBackend {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match self {
            StoreBackend::Sqlite(store) => store.get(key).await,
            StoreBackend::Memory(store) => store.get(key).await,
            StoreBackend::Disabled(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        match self {
            StoreBackend::Sqlite(store) => store.set(key, value).await,
            StoreBackend::Memory(store) => store.set(key, value).await,
            StoreBackend::Disabled(store) => store.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        match self {
            StoreBackend::Sqlite(store) => store.remove(key).await,
            StoreBackend::Memory(store) => store.remove(key).await,
            StoreBackend::Disabled(store) => store.remove(key).await,
        }
    }
}

impl From<SqliteStore> for StoreBackend {
    fn from(store: SqliteStore) -> Self {
        StoreBackend::Sqlite(store)
    }
}

impl From<MemoryStore> for StoreBackend {
    fn from(store: MemoryStore) -> Self {
        StoreBackend::Memory(store)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
