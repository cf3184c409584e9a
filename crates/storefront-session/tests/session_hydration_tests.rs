//! Hydration behaviour of a cart session against real and gated stores.

use std::sync::Arc;

use tokio::sync::Notify;

use storefront_core::{apply, CartAction, CartProduct, CartState, Money};
use storefront_session::{CartSession, SessionOptions, StorefrontConfig};
use storefront_store::{
    decode_cart, encode_cart, KeyValueStore, MemoryStore, SqliteStore, StoreBackend, StoreConfig,
    StoreResult,
};

const KEY: &str = "outside-zone-cart";

fn product(id: &str, cents: i64) -> CartProduct {
    CartProduct::new(id, format!("Product {}", id), Money::from_cents(cents))
}

fn cart_of(actions: Vec<CartAction>) -> CartState {
    actions.into_iter().fold(CartState::new(), apply)
}

/// Holds every read until the test opens the gate.
#[derive(Clone)]
struct GatedStore {
    inner: MemoryStore,
    gate: Arc<Notify>,
}

impl KeyValueStore for GatedStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.gate.notified().await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.remove(key).await
    }
}

#[tokio::test]
async fn mutation_during_hydration_is_replayed_onto_stored_cart() {
    let stored = cart_of(vec![CartAction::add(product("A", 1000))]);
    let memory = MemoryStore::with_value(KEY, encode_cart(&stored).unwrap());
    let gate = Arc::new(Notify::new());
    let store = GatedStore {
        inner: memory.clone(),
        gate: Arc::clone(&gate),
    };

    let mut session = CartSession::start(store, SessionOptions::default());
    let cart = session.handle();
    let hydrating = tokio::spawn(async move {
        session.hydrate().await;
        session
    });

    cart.add_to_cart(product("B", 500));
    cart.add_to_cart(product("A", 1000));

    // Provisional view: only what was dispatched so far
    assert!(!cart.is_ready());
    assert_eq!(cart.state().item_count(), 2);
    assert_eq!(memory.write_count(), 0);

    gate.notify_one();
    let session = hydrating.await.unwrap();

    assert!(cart.is_ready());
    let state = cart.state();
    let ids: Vec<&str> = state.items().iter().map(|line| line.id.as_str()).collect();
    assert_eq!(ids, ["A", "B"]);
    assert_eq!(state.line("A").unwrap().quantity, 2);
    assert_eq!(state.subtotal().cents(), 2500);
    assert_eq!(state.item_count(), 3);

    session.close().await;
    let persisted = decode_cart(&memory.get(KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(persisted, state);
}

#[tokio::test]
async fn nothing_is_written_before_hydration() {
    let memory = MemoryStore::new();
    let session = CartSession::start(memory.clone(), SessionOptions::default());
    let cart = session.handle();

    cart.add_to_cart(product("A", 1000));
    cart.update_quantity("A", 4);
    tokio::task::yield_now().await;

    assert_eq!(memory.write_count(), 0);
    assert_eq!(memory.get(KEY).await.unwrap(), None);
    session.close().await;
    assert_eq!(memory.write_count(), 0);
}

#[tokio::test]
async fn corrupt_storage_starts_empty_and_ready() {
    let memory = MemoryStore::with_value(KEY, "{not-json");
    let session = CartSession::open(memory.clone(), SessionOptions::default()).await;
    let cart = session.handle();

    assert!(cart.is_ready());
    assert!(cart.state().is_empty());
    assert!(session.is_persisting());

    session.close().await;
    let rewritten = decode_cart(&memory.get(KEY).await.unwrap().unwrap()).unwrap();
    assert!(rewritten.is_empty());
}

#[tokio::test]
async fn future_record_version_starts_empty() {
    let raw = r#"{"version":2,"items":[{"id":"A","title":"Hoodie","unitPrice":1000,"quantity":1}],"subtotal":1000,"itemCount":1}"#;
    let session = CartSession::open(MemoryStore::with_value(KEY, raw), SessionOptions::default()).await;

    assert!(session.handle().is_ready());
    assert!(session.handle().state().is_empty());
    session.close().await;
}

#[tokio::test]
async fn overflowing_snapshot_starts_empty() {
    let raw = r#"{"items":[{"id":"A","title":"A","unitPrice":9223372036854775807,"quantity":2}],"subtotal":0,"itemCount":2}"#;
    let memory = MemoryStore::with_value(KEY, raw);
    let session = CartSession::open(memory.clone(), SessionOptions::default()).await;
    let cart = session.handle();

    assert!(cart.is_ready());
    assert!(cart.state().is_empty());
    assert!(session.is_persisting());

    cart.add_to_cart(product("B", 500));
    session.close().await;
    let rewritten = decode_cart(&memory.get(KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(rewritten.subtotal().cents(), 500);
}

#[tokio::test]
async fn trusted_overflowing_snapshot_is_loaded_without_panicking() {
    let raw = r#"{"items":[
        {"id":"A","title":"A","unitPrice":9223372036854775807,"quantity":2},
        {"id":"B","title":"B","unitPrice":500,"quantity":1}
    ],"subtotal":0,"itemCount":3}"#;
    let options = SessionOptions::default().trust_snapshot(true);
    let session = CartSession::open(MemoryStore::with_value(KEY, raw), options).await;
    let cart = session.handle();

    cart.update_quantity("A", 5);
    assert_eq!(cart.state().line("A").unwrap().quantity, 2);

    cart.remove_from_cart("A");
    assert_eq!(cart.state().subtotal().cents(), 500);
    assert_eq!(cart.state().item_count(), 1);
    session.close().await;
}

#[tokio::test]
async fn cart_saved_by_previous_storefront_is_restored() {
    let raw = r#"{"items":[
        {"id":"1","title":"Outside-Zone Tech T-Shirt","price":29.99,"image":"/tee.jpg","quantity":2,"slug":"tech-t-shirt"},
        {"id":"4","title":"Trail Cap","price":0.1,"image":"/cap.jpg","quantity":3,"slug":"trail-cap"}
    ],"total":60.28000000000001,"itemCount":5}"#;
    let memory = MemoryStore::with_value(KEY, raw);
    let session = CartSession::open(memory.clone(), SessionOptions::default()).await;

    let state = session.handle().state();
    assert_eq!(state.line("1").unwrap().unit_price.cents(), 2999);
    assert_eq!(state.line("4").unwrap().unit_price.cents(), 10);
    assert_eq!(state.subtotal().cents(), 6028);
    assert_eq!(state.item_count(), 5);
    session.close().await;

    let upgraded = memory.get(KEY).await.unwrap().unwrap();
    assert!(upgraded.contains("\"unitPrice\":2999"));
    assert_eq!(decode_cart(&upgraded).unwrap(), state);
}

#[tokio::test]
async fn legacy_record_without_version_is_restored() {
    let raw = r#"{"items":[{"id":"1","title":"Tech T-Shirt","image":"/tee.png","slug":"tech-t-shirt","unitPrice":2999,"quantity":2}],"subtotal":5998,"itemCount":2}"#;
    let session = CartSession::open(MemoryStore::with_value(KEY, raw), SessionOptions::default()).await;

    let state = session.handle().state();
    assert_eq!(state.item_count(), 2);
    assert_eq!(state.line("1").unwrap().slug, "tech-t-shirt");
    session.close().await;
}

#[tokio::test]
async fn inconsistent_snapshot_repaired_unless_trusted() {
    let raw = r#"{"version":1,"items":[
        {"id":"A","title":"Hoodie","unitPrice":1000,"quantity":1},
        {"id":"B","title":"Cap","unitPrice":500,"quantity":0},
        {"id":"A","title":"Hoodie","unitPrice":1000,"quantity":2}
    ],"subtotal":42,"itemCount":42}"#;

    let repaired = CartSession::open(MemoryStore::with_value(KEY, raw), SessionOptions::default()).await;
    let state = repaired.handle().state();
    assert_eq!(state.line_count(), 1);
    assert_eq!(state.line("A").unwrap().quantity, 3);
    assert_eq!(state.subtotal().cents(), 3000);
    assert_eq!(state.item_count(), 3);
    assert!(state.check_invariants().is_ok());
    repaired.close().await;

    let mut config = StorefrontConfig::default();
    config.storage.trust_snapshot = true;
    let trusted = CartSession::open(MemoryStore::with_value(KEY, raw), config.session_options()).await;
    let state = trusted.handle().state();
    assert_eq!(state.line_count(), 3);
    assert_eq!(state.subtotal().cents(), 42);
    trusted.close().await;
}

#[tokio::test]
async fn hydrate_runs_once() {
    let stored = cart_of(vec![CartAction::add(product("A", 1000))]);
    let memory = MemoryStore::with_value(KEY, encode_cart(&stored).unwrap());
    let mut session = CartSession::start(memory, SessionOptions::default());

    session.hydrate().await;
    let cart = session.handle();
    cart.clear_cart();
    session.hydrate().await;

    assert!(cart.state().is_empty());
    session.close().await;
}

#[tokio::test]
async fn cart_survives_across_sqlite_sessions() {
    let sqlite = SqliteStore::new(StoreConfig::in_memory()).await.unwrap();

    let first = CartSession::open(StoreBackend::from(sqlite.clone()), SessionOptions::default()).await;
    let cart = first.handle();
    cart.add_to_cart(product("A", 1000));
    cart.add_to_cart(product("B", 500));
    cart.add_to_cart(product("A", 1000));
    cart.update_quantity("B", 3);
    let expected = cart.state();
    first.close().await;

    let second = CartSession::open(StoreBackend::from(sqlite), SessionOptions::default()).await;
    let restored = second.handle().state();
    assert_eq!(restored, expected);
    assert_eq!(restored.subtotal().cents(), 3500);
    assert_eq!(restored.item_count(), 5);
    second.close().await;
}

#[tokio::test]
async fn sessions_with_different_keys_are_separate() {
    let memory = MemoryStore::new();

    let main = CartSession::open(memory.clone(), SessionOptions::default()).await;
    main.handle().add_to_cart(product("A", 1000));
    main.close().await;

    let preview = CartSession::open(
        memory.clone(),
        SessionOptions::default().with_cart_key("preview-cart"),
    )
    .await;
    assert!(preview.handle().state().is_empty());
    preview.close().await;

    assert!(memory.get(KEY).await.unwrap().is_some());
    assert!(memory.get("preview-cart").await.unwrap().is_some());
}
