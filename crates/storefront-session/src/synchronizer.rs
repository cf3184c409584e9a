//! # Persistence Synchronizer
//!
//! Reads the stored cart once at session start and mirrors every later
//! snapshot back into storage.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Hydration and Write-Through                          │
//! │                                                                         │
//! │  load_snapshot(store, key)                                             │
//! │       │                                                                 │
//! │       ├── Ok(Some(raw)) ─► decode ─► repair? ─► Restored(cart)          │
//! │       ├── Ok(None) ──────────────────────────► Empty                    │
//! │       ├── malformed record ─ warn ───────────► Empty                    │
//! │       ├── totals overflow ─ warn ────────────► Empty                    │
//! │       └── store error ─ warn ────────────────► Unavailable              │
//! │                                                                         │
//! │  (session marks itself ready, replays queued actions)                  │
//! │                                                                         │
//! │  spawn_writer(store, key, watch::Receiver<CartState>)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  write current snapshot ──► loop { changed() ──► write latest }         │
//! │       │                                                                 │
//! │       ├── write fails ─ warn once ─► disable, stop writing              │
//! │       └── shutdown ─► flush unseen snapshot ─► exit                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Snapshots arriving faster than storage accepts them are coalesced by the
//! watch channel; only the newest one is written.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use storefront_core::validation::{repair_snapshot, validate_snapshot};
use storefront_core::CartState;
use storefront_store::{decode_cart, encode_cart, KeyValueStore, StoreError, StoreResult};

// =============================================================================
// Hydration
// =============================================================================

/// What hydration found in storage.
#[derive(Debug, Clone, PartialEq)]
pub enum HydrationOutcome {
    /// A prior cart was found and decoded.
    Restored(CartState),

    /// Nothing usable was stored; start from an empty cart.
    Empty,

    /// Storage could not be read. The session runs memory-only.
    Unavailable,
}

impl HydrationOutcome {
    /// The snapshot to load, if any.
    pub fn into_snapshot(self) -> Option<CartState> {
        match self {
            HydrationOutcome::Restored(cart) => Some(cart),
            HydrationOutcome::Empty | HydrationOutcome::Unavailable => None,
        }
    }

    pub fn storage_available(&self) -> bool {
        !matches!(self, HydrationOutcome::Unavailable)
    }
}

/// Reads and decodes the cart stored under `key`.
///
/// Never fails: malformed data becomes [`HydrationOutcome::Empty`] and a
/// failing store becomes [`HydrationOutcome::Unavailable`], both logged.
/// Unless `trust_snapshot` is set, an inconsistent snapshot is repaired
/// before it is handed back.
pub async fn load_snapshot<S: KeyValueStore>(
    store: &S,
    key: &str,
    trust_snapshot: bool,
) -> HydrationOutcome {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "No stored cart");
            return HydrationOutcome::Empty;
        }
        Err(e) => {
            warn!(key, error = %e, "Cart storage unavailable, continuing memory-only");
            return HydrationOutcome::Unavailable;
        }
    };

    let cart = match decode_cart(&raw) {
        Ok(cart) => cart,
        Err(e) if e.is_malformed_record() => {
            warn!(key, error = %e, "Ignoring unreadable stored cart");
            return HydrationOutcome::Empty;
        }
        Err(e) => {
            warn!(key, error = %e, "Stored cart could not be decoded, continuing memory-only");
            return HydrationOutcome::Unavailable;
        }
    };

    if trust_snapshot {
        return HydrationOutcome::Restored(cart);
    }

    match validate_snapshot(&cart) {
        Ok(()) => HydrationOutcome::Restored(cart),
        Err(problem) => match repair_snapshot(cart) {
            Ok(repaired) => {
                warn!(key, %problem, "Stored cart inconsistent, repaired");
                HydrationOutcome::Restored(repaired)
            }
            Err(e) => {
                warn!(key, %problem, error = %e, "Ignoring stored cart that cannot be repaired");
                HydrationOutcome::Empty
            }
        },
    }
}

// =============================================================================
// Write-Through
// =============================================================================

/// Handle to a running writer task.
#[derive(Debug)]
pub struct Writer {
    task: JoinHandle<()>,
    shutdown: oneshot::Sender<()>,
    enabled: Arc<AtomicBool>,
}

impl Writer {
    /// False once a write has failed and the writer has stopped.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Writes any snapshot not yet written, then waits for the task to end.
    pub async fn finish(self) {
        // Err means the task already exited on its own
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            warn!(error = %e, "Cart writer task ended abnormally");
        }
    }
}

async fn persist<S: KeyValueStore>(store: &S, key: &str, cart: &CartState) -> StoreResult<()> {
    let raw = encode_cart(cart)?;
    store.set(key, &raw).await?;
    debug!(key, items = cart.item_count(), "Cart written through");
    Ok(())
}

/// Starts the write-through task.
///
/// The snapshot current in `snapshots` is written straight away; after that,
/// every change is written until shutdown or the first failure.
pub fn spawn_writer<S: KeyValueStore>(
    store: Arc<S>,
    key: String,
    mut snapshots: watch::Receiver<CartState>,
) -> Writer {
    let enabled = Arc::new(AtomicBool::new(true));
    let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
    let flag = Arc::clone(&enabled);

    let task = tokio::spawn(async move {
        let disable = |e: &StoreError| {
            warn!(key = %key, error = %e, "Cart write failed, persistence disabled for this session");
            flag.store(false, Ordering::SeqCst);
        };

        let first = snapshots.borrow_and_update().clone();
        if let Err(e) = persist(&*store, &key, &first).await {
            disable(&e);
            return;
        }

        loop {
            tokio::select! {
                biased;

                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let latest = snapshots.borrow_and_update().clone();
                    if let Err(e) = persist(&*store, &key, &latest).await {
                        disable(&e);
                        return;
                    }
                }

                _ = &mut shutdown_rx => {
                    if snapshots.has_changed().unwrap_or(false) {
                        let latest = snapshots.borrow_and_update().clone();
                        if let Err(e) = persist(&*store, &key, &latest).await {
                            disable(&e);
                            return;
                        }
                    }
                    break;
                }
            }
        }

        info!(key = %key, "Cart writer stopped");
    });

    Writer {
        task,
        shutdown,
        enabled,
    }
}
