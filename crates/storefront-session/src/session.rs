//! # Cart Session
//!
//! One cart per session, shared by every consumer through [`CartHandle`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Session                                     │
//! │                                                                         │
//! │  badge ──┐                                                              │
//! │  drawer ─┼── CartHandle (clone) ──► dispatch(action)                   │
//! │  line  ──┘                              │                               │
//! │                                         ▼                               │
//! │                       ┌──────────────────────────────────┐             │
//! │                       │ Mutex<Dispatch>                  │             │
//! │                       │  ready: bool                     │             │
//! │                       │  pending: Vec<CartAction>        │  queued     │
//! │                       └──────────────┬───────────────────┘  until      │
//! │                                      │ apply(state, action)  ready     │
//! │                                      ▼                                  │
//! │                       watch::Sender<CartState> ──► subscribers         │
//! │                                      │                                  │
//! │                                      ▼ (after hydration)                │
//! │                              synchronizer writer ──► KeyValueStore      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Hydration Ordering
//! Actions dispatched before [`CartSession::hydrate`] finishes are applied
//! to the provisional empty cart so consumers see them at once, and are
//! also queued. Hydration loads the stored snapshot and replays the queue
//! on top of it, so nothing the user did before hydration is lost and the
//! first write is the hydrated-then-mutated cart.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

use storefront_core::{apply, CartAction, CartProduct, CartState, CartTotals};
use storefront_store::KeyValueStore;

use crate::config::DEFAULT_CART_KEY;
use crate::synchronizer::{self, Writer};

// =============================================================================
// Options
// =============================================================================

/// Per-session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Storage key the cart lives under.
    pub cart_key: String,

    /// Load the stored cart verbatim instead of repairing it.
    pub trust_snapshot: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            cart_key: DEFAULT_CART_KEY.to_string(),
            trust_snapshot: false,
        }
    }
}

impl SessionOptions {
    pub fn with_cart_key(mut self, key: impl Into<String>) -> Self {
        self.cart_key = key.into();
        self
    }

    pub fn trust_snapshot(mut self, trust: bool) -> Self {
        self.trust_snapshot = trust;
        self
    }
}

// =============================================================================
// Shared State
// =============================================================================

#[derive(Debug, Default)]
struct Dispatch {
    ready: bool,
    pending: Vec<CartAction>,
}

#[derive(Debug)]
struct Shared {
    session_id: Uuid,
    dispatch: Mutex<Dispatch>,
    state: watch::Sender<CartState>,
}

impl Shared {
    fn new() -> Self {
        let (state, _) = watch::channel(CartState::new());
        Shared {
            session_id: Uuid::new_v4(),
            dispatch: Mutex::new(Dispatch::default()),
            state,
        }
    }

    /// `apply` cannot panic halfway through a state change, so a poisoned
    /// lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Dispatch> {
        self.dispatch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, action: CartAction) {
        let mut guard = self.lock();
        let kind = action.kind();

        if !guard.ready {
            guard.pending.push(action.clone());
        }

        let current = self.state.borrow().clone();
        let next = apply(current, action);
        debug!(
            session = %self.session_id,
            action = kind,
            ready = guard.ready,
            items = next.item_count(),
            subtotal = next.subtotal().cents(),
            "Cart dispatch"
        );
        self.state.send_replace(next);
    }

    /// Loads `snapshot`, replays queued actions, and flips the ready flag,
    /// all under the dispatch lock.
    fn complete_hydration(&self, snapshot: Option<CartState>) {
        let mut guard = self.lock();
        if guard.ready {
            return;
        }

        let base = apply(
            CartState::new(),
            CartAction::LoadSnapshot(snapshot.unwrap_or_default()),
        );
        let replayed = guard.pending.len();
        let next = guard.pending.drain(..).fold(base, apply);

        info!(
            session = %self.session_id,
            replayed,
            lines = next.line_count(),
            items = next.item_count(),
            "Cart hydrated"
        );
        self.state.send_replace(next);
        guard.ready = true;
    }

    fn is_ready(&self) -> bool {
        self.lock().ready
    }
}

// =============================================================================
// Cart Handle
// =============================================================================

/// The cart facade consumers hold.
///
/// Cheap to clone; every clone sees and mutates the same cart. An inert
/// handle (`CartHandle::inert()` or `Default`) is what a consumer outside
/// any session gets: it reads as an empty, never-ready cart and ignores
/// mutations.
#[derive(Debug, Clone, Default)]
pub struct CartHandle {
    shared: Option<Arc<Shared>>,
}

impl CartHandle {
    /// A handle attached to no session.
    pub fn inert() -> Self {
        CartHandle { shared: None }
    }

    pub fn is_inert(&self) -> bool {
        self.shared.is_none()
    }

    /// Id of the owning session, for log correlation.
    pub fn session_id(&self) -> Option<Uuid> {
        self.shared.as_ref().map(|shared| shared.session_id)
    }

    /// Current snapshot.
    pub fn state(&self) -> CartState {
        match &self.shared {
            Some(shared) => shared.state.borrow().clone(),
            None => CartState::new(),
        }
    }

    /// Receiver that is notified on every new snapshot.
    ///
    /// For an inert handle the receiver holds the empty cart and its
    /// `changed()` resolves to an error straight away.
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        match &self.shared {
            Some(shared) => shared.state.subscribe(),
            None => watch::channel(CartState::new()).1,
        }
    }

    /// True once hydration has finished, whatever its outcome.
    pub fn is_ready(&self) -> bool {
        self.shared.as_ref().is_some_and(|shared| shared.is_ready())
    }

    pub fn totals(&self) -> CartTotals {
        self.state().totals()
    }

    pub fn add_to_cart(&self, item: CartProduct) {
        self.dispatch(CartAction::add(item));
    }

    pub fn remove_from_cart(&self, id: &str) {
        self.dispatch(CartAction::remove(id));
    }

    /// Sets a line's quantity; zero or less removes the line.
    pub fn update_quantity(&self, id: &str, quantity: i64) {
        self.dispatch(CartAction::update_quantity(id, quantity));
    }

    pub fn clear_cart(&self) {
        self.dispatch(CartAction::ClearCart);
    }

    fn dispatch(&self, action: CartAction) {
        if let Some(shared) = &self.shared {
            shared.dispatch(action);
        }
    }
}

// =============================================================================
// Cart Session
// =============================================================================

/// Owns the cart for one session and its persistence.
///
/// ## Usage
/// ```rust,ignore
/// let backend = config.open_backend().await;
/// let session = CartSession::open(backend, config.session_options()).await;
///
/// let cart = session.handle();
/// cart.add_to_cart(product);
///
/// session.close().await; // final write-through
/// ```
#[derive(Debug)]
pub struct CartSession<S: KeyValueStore> {
    store: Arc<S>,
    options: SessionOptions,
    handle: CartHandle,
    writer: Option<Writer>,
    hydrated: bool,
}

impl<S: KeyValueStore> CartSession<S> {
    /// Creates a session with an empty, not-yet-ready cart.
    pub fn start(store: S, options: SessionOptions) -> Self {
        let shared = Arc::new(Shared::new());
        info!(
            session = %shared.session_id,
            key = %options.cart_key,
            "Cart session started"
        );
        CartSession {
            store: Arc::new(store),
            options,
            handle: CartHandle {
                shared: Some(shared),
            },
            writer: None,
            hydrated: false,
        }
    }

    /// Starts a session and hydrates it.
    pub async fn open(store: S, options: SessionOptions) -> Self {
        let mut session = Self::start(store, options);
        session.hydrate().await;
        session
    }

    /// Loads the stored cart and turns write-through on.
    ///
    /// Runs once; later calls do nothing. Never fails: unreadable data
    /// starts an empty cart, an unreadable store leaves the session
    /// memory-only. Either way the handle reports ready afterwards.
    pub async fn hydrate(&mut self) {
        if self.hydrated {
            debug!("Cart session already hydrated");
            return;
        }
        self.hydrated = true;

        let outcome = synchronizer::load_snapshot(
            &*self.store,
            &self.options.cart_key,
            self.options.trust_snapshot,
        )
        .await;
        let storage_available = outcome.storage_available();

        let Some(shared) = &self.handle.shared else {
            return;
        };
        shared.complete_hydration(outcome.into_snapshot());

        if storage_available {
            self.writer = Some(synchronizer::spawn_writer(
                Arc::clone(&self.store),
                self.options.cart_key.clone(),
                shared.state.subscribe(),
            ));
        }
    }

    /// A new handle onto this session's cart.
    pub fn handle(&self) -> CartHandle {
        self.handle.clone()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The store this session persists to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// True while changes are being written to storage.
    pub fn is_persisting(&self) -> bool {
        self.writer.as_ref().is_some_and(Writer::is_enabled)
    }

    /// Writes the final snapshot and stops the writer.
    ///
    /// Handles stay usable afterwards but changes are no longer persisted.
    pub async fn close(mut self) {
        if let Some(writer) = self.writer.take() {
            writer.finish().await;
        }
        info!(session = ?self.handle.session_id(), "Cart session closed");
    }
}
