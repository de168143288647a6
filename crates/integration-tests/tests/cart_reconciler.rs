//! End-to-end session cart reconciler scenarios.
//!
//! Exercises the cart through its public surface with in-memory fakes:
//! the add/update/remove invariants, the sign-in merge, sign-out erasure,
//! and the best-effort remote sync policy.

use std::sync::Arc;

use rindhouse_core::{CustomerId, LineKey, ProductId, VariantLabel};
use rindhouse_integration_tests::{FakeRemoteCart, RemoteCall, cheese_catalog};
use rindhouse_storefront::identity::Identity;
use rindhouse_storefront::services::SessionCart;
use rindhouse_storefront::store::{CartStore, MemoryStore};
use rust_decimal::Decimal;

struct Harness {
    cart: SessionCart,
    remote: Arc<FakeRemoteCart>,
    store: Arc<MemoryStore>,
}

fn harness(remote: FakeRemoteCart) -> Harness {
    let remote = Arc::new(remote);
    let store = Arc::new(MemoryStore::new());
    let cart = SessionCart::new(
        Arc::new(cheese_catalog()),
        Arc::clone(&store) as Arc<dyn CartStore>,
        Arc::clone(&remote) as Arc<dyn rindhouse_storefront::remote::RemoteCart>,
    );
    Harness {
        cart,
        remote,
        store,
    }
}

fn key(product: &str) -> LineKey {
    LineKey::new(ProductId::new(product), VariantLabel::default())
}

fn customer() -> Identity {
    Identity::new(CustomerId::new("cust-1"), "tok-0123456789abcdef")
}

async fn sign_in(h: &Harness) {
    h.cart.identity_changed(Some(customer())).await;
}

// =============================================================================
// Local invariants
// =============================================================================

#[tokio::test]
async fn idempotent_key_merge_sums_quantities() {
    let h = harness(FakeRemoteCart::new());

    h.cart
        .add_line(ProductId::new("a"), 2, VariantLabel::default());
    h.cart
        .add_line(ProductId::new("a"), 1, VariantLabel::default());
    h.cart
        .add_line(ProductId::new("a"), 4, VariantLabel::default());

    let items = h.cart.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 7);
}

#[tokio::test]
async fn quantity_floor_removes_the_line() {
    let h = harness(FakeRemoteCart::new());
    h.cart
        .add_line(ProductId::new("a"), 3, VariantLabel::default());

    h.cart.update_quantity(&key("a"), 0);

    assert!(h.cart.items().is_empty());
    // And the persisted copy reflects the removal.
    assert_eq!(
        h.store.load().map(|s| s.lines().len()),
        Some(0)
    );
}

#[tokio::test]
async fn subtotal_correctness() {
    let h = harness(FakeRemoteCart::new());
    h.cart
        .add_line(ProductId::new("a"), 2, VariantLabel::default());
    h.cart
        .add_line(ProductId::new("b"), 1, VariantLabel::default());

    let totals = h.cart.totals();
    assert_eq!(totals.subtotal, Decimal::from(250));
    assert_eq!(totals.total_items, 3);
}

#[tokio::test]
async fn guest_mutations_never_call_the_remote() {
    let h = harness(FakeRemoteCart::new());

    h.cart
        .add_line(ProductId::new("a"), 2, VariantLabel::default());
    h.cart.update_quantity(&key("a"), 5);
    h.cart.remove_line(&key("a"));
    h.cart.clear();
    h.cart.flush_sync().await;

    assert!(h.remote.calls().is_empty());
}

// =============================================================================
// Sign-in merge
// =============================================================================

#[tokio::test]
async fn sign_in_merge_remote_wins_and_local_only_is_pushed() {
    // local [{A,2},{B,1}], remote [{A,5}] => [{A,5},{B,1}], B pushed
    let h = harness(FakeRemoteCart::with_lines([("a", 5)]));
    h.cart
        .add_line(ProductId::new("a"), 2, VariantLabel::default());
    h.cart
        .add_line(ProductId::new("b"), 1, VariantLabel::default());

    sign_in(&h).await;
    h.cart.flush_sync().await;

    let items = h.cart.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].product_id, ProductId::new("a"));
    assert_eq!(items[0].quantity, 5);
    assert_eq!(items[1].product_id, ProductId::new("b"));
    assert_eq!(items[1].quantity, 1);

    assert_eq!(
        h.remote.mutation_calls(),
        vec![RemoteCall::Add {
            product_id: "b".to_owned(),
            quantity: 1
        }]
    );
}

#[tokio::test]
async fn sign_in_adopts_remote_when_local_empty_without_pushes() {
    let h = harness(FakeRemoteCart::with_lines([("c", 3)]));

    sign_in(&h).await;
    h.cart.flush_sync().await;

    let items = h.cart.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, ProductId::new("c"));
    assert_eq!(items[0].quantity, 3);

    // Only the fetch went out - no pushes.
    assert_eq!(h.remote.calls(), vec![RemoteCall::Fetch]);
}

#[tokio::test]
async fn sign_in_fetch_failure_keeps_local_cart() {
    let remote = FakeRemoteCart::with_lines([("a", 5)]);
    remote.fail_fetch();
    let h = harness(remote);
    h.cart
        .add_line(ProductId::new("b"), 2, VariantLabel::default());

    sign_in(&h).await;
    h.cart.flush_sync().await;

    // No merge happened; the local cart stands and nothing was pushed.
    let items = h.cart.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, ProductId::new("b"));
    assert!(h.remote.mutation_calls().is_empty());
    assert!(!h.cart.is_loading());
}

#[tokio::test]
async fn sign_in_merge_persists_and_republishes() {
    let h = harness(FakeRemoteCart::with_lines([("a", 5)]));
    let badge = h.cart.subscribe_items();
    h.cart
        .add_line(ProductId::new("b"), 1, VariantLabel::default());

    sign_in(&h).await;

    assert_eq!(*badge.borrow(), 6);
    let persisted = h.store.load().expect("persisted after merge");
    assert_eq!(persisted.total_items(), 6);
    assert!(!h.cart.is_loading());
}

// =============================================================================
// Sign-out
// =============================================================================

#[tokio::test]
async fn sign_out_erases_memory_and_store() {
    let h = harness(FakeRemoteCart::new());
    sign_in(&h).await;
    h.cart
        .add_line(ProductId::new("a"), 2, VariantLabel::default());
    assert!(h.store.load().is_some());

    h.cart.identity_changed(None).await;
    h.cart.flush_sync().await;

    assert!(h.cart.items().is_empty());
    assert!(h.store.load().is_none());
    // Sign-out is local-only: the add was mirrored, but sign-out itself
    // issued no remote call.
    assert_eq!(
        h.remote.mutation_calls(),
        vec![RemoteCall::Add {
            product_id: "a".to_owned(),
            quantity: 2
        }]
    );
}

// =============================================================================
// Best-effort remote sync
// =============================================================================

#[tokio::test]
async fn remote_add_failure_leaves_local_line_intact() {
    let remote = FakeRemoteCart::new();
    remote.fail_mutations();
    let h = harness(remote);
    sign_in(&h).await;

    h.cart
        .add_line(ProductId::new("a"), 2, VariantLabel::default());
    h.cart.flush_sync().await;

    // The remote add was attempted and failed; the line is still in
    // memory and in the persisted copy.
    assert_eq!(
        h.remote.mutation_calls(),
        vec![RemoteCall::Add {
            product_id: "a".to_owned(),
            quantity: 2
        }]
    );
    assert_eq!(h.cart.items().len(), 1);
    assert_eq!(h.store.load().map(|s| s.total_items()), Some(2));
}

#[tokio::test]
async fn authenticated_mutations_mirror_in_dispatch_order() {
    let h = harness(FakeRemoteCart::new());
    sign_in(&h).await;

    h.cart
        .add_line(ProductId::new("a"), 2, VariantLabel::default());
    h.cart.update_quantity(&key("a"), 5);
    h.cart.remove_line(&key("a"));
    h.cart.clear();
    h.cart.flush_sync().await;

    assert_eq!(
        h.remote.mutation_calls(),
        vec![
            RemoteCall::Add {
                product_id: "a".to_owned(),
                quantity: 2
            },
            RemoteCall::Update {
                product_id: "a".to_owned(),
                quantity: 5
            },
            RemoteCall::Remove {
                product_id: "a".to_owned()
            },
            RemoteCall::Clear,
        ]
    );
}

#[tokio::test]
async fn update_to_zero_mirrors_as_remove() {
    let h = harness(FakeRemoteCart::new());
    sign_in(&h).await;

    h.cart
        .add_line(ProductId::new("a"), 2, VariantLabel::default());
    h.cart.update_quantity(&key("a"), 0);
    h.cart.flush_sync().await;

    assert_eq!(
        h.remote.mutation_calls(),
        vec![
            RemoteCall::Add {
                product_id: "a".to_owned(),
                quantity: 2
            },
            RemoteCall::Remove {
                product_id: "a".to_owned()
            },
        ]
    );
}
