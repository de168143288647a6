//! Session cart reconciler.
//!
//! Owns the authoritative list of `(product, quantity, variant)` lines for
//! the current browsing session. Every mutation applies to memory and the
//! local store synchronously; when the shopper is authenticated, the
//! mutation is additionally mirrored to the remote cart through the
//! outbound queue. Remote failures never block, roll back, or surface to
//! the shopper - the local cart is authoritative for the session.
//!
//! Identity transitions drive the reconciliation rules:
//! - signing in merges local and server carts (server wins per product,
//!   local-only products are pushed up)
//! - signing out discards the guest cart and its persisted copy entirely

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rindhouse_core::{CartLine, CartState, LineKey, Product, ProductId, VariantLabel};
use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::catalog::CatalogProvider;
use crate::identity::Identity;
use crate::remote::RemoteCart;
use crate::store::CartStore;
use crate::sync::{SyncOp, SyncQueue};

/// Totals derived from the current cart and the catalog.
///
/// Products missing from the catalog contribute zero to the subtotal and
/// are skipped; their quantities still count toward `total_items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of all line quantities.
    pub total_items: u32,
    /// Sum of catalog price times quantity over priceable lines.
    pub subtotal: Decimal,
}

/// The session cart reconciler.
///
/// An explicitly constructed, injected service object - created at
/// application start, torn down at end. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct SessionCart {
    inner: Arc<SessionCartInner>,
}

struct SessionCartInner {
    state: Mutex<CartState>,
    identity: Mutex<Option<Identity>>,
    /// Set while the sign-in merge fetch is in flight.
    loading: AtomicBool,
    catalog: Arc<dyn CatalogProvider>,
    store: Arc<dyn CartStore>,
    remote: Arc<dyn RemoteCart>,
    sync: SyncQueue,
    /// Republishes the total item count to observers (header badge).
    badge: watch::Sender<u32>,
}

impl SessionCart {
    /// Initialize the session cart, reading any persisted local copy.
    ///
    /// Absent or malformed persisted data starts an empty cart; this never
    /// fails. Must be called from within a tokio runtime (the outbound
    /// sync worker is spawned here).
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        store: Arc<dyn CartStore>,
        remote: Arc<dyn RemoteCart>,
    ) -> Self {
        let state = store.load().unwrap_or_default();
        debug!(lines = state.lines().len(), "session cart initialized");

        let (badge, _) = watch::channel(state.total_items());
        let sync = SyncQueue::spawn(Arc::clone(&remote));

        Self {
            inner: Arc::new(SessionCartInner {
                state: Mutex::new(state),
                identity: Mutex::new(None),
                loading: AtomicBool::new(false),
                catalog,
                store,
                remote,
                sync,
                badge,
            }),
        }
    }

    // =========================================================================
    // Identity transitions
    // =========================================================================

    /// Observe an identity change from the auth collaborator.
    ///
    /// Only absent/present transitions matter: sign-in triggers the merge
    /// with the server cart, sign-out discards the guest cart. An identity
    /// with an empty id or token counts as absent. Same-presence changes
    /// (e.g. a token refresh) just update the stored identity.
    #[instrument(skip_all, fields(present = identity.is_some()))]
    pub async fn identity_changed(&self, identity: Option<Identity>) {
        let next = identity.filter(Identity::is_authenticated);
        let was_present = {
            let mut current = self
                .inner
                .identity
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let was_present = current.is_some();
            *current = next.clone();
            was_present
        };

        match (was_present, next.is_some()) {
            (false, true) => self.sign_in_merge().await,
            (true, false) => self.sign_out(),
            _ => {}
        }
    }

    /// Merge the local cart with the server cart after sign-in.
    ///
    /// Server lines win for every product they mention; local-only lines
    /// survive and are pushed to the server one call per line, each
    /// best-effort. A failed fetch keeps the local cart untouched.
    async fn sign_in_merge(&self) {
        self.inner.loading.store(true, Ordering::SeqCst);

        match self.inner.remote.fetch().await {
            Ok(remote_lines) => {
                let remote: Vec<CartLine> = remote_lines
                    .into_iter()
                    .map(crate::remote::RemoteCartLine::into_cart_line)
                    .collect();

                let mut state = self.lock_state();
                let outcome = state.merge_remote(remote);

                for line in &outcome.local_only {
                    self.inner.sync.enqueue(SyncOp::Add {
                        product_id: line.product_id.clone(),
                        quantity: line.quantity,
                    });
                }
                if !outcome.local_only.is_empty() {
                    info!(
                        pushed = outcome.local_only.len(),
                        "pushing local-only lines to remote cart"
                    );
                }

                *state = outcome.merged;
                self.persist_and_publish(&state);
            }
            Err(e) => {
                warn!(error = %e, "remote cart fetch failed at sign-in; keeping local cart");
            }
        }

        self.inner.loading.store(false, Ordering::SeqCst);
    }

    /// Discard the guest cart on sign-out: memory and the persisted copy.
    /// No merge, no remote call.
    fn sign_out(&self) {
        let mut state = self.lock_state();
        state.clear();
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "failed to erase persisted cart at sign-out");
        }
        let _ = self.inner.badge.send(0);
        info!("signed out; guest cart discarded");
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a quantity of a product variant to the cart.
    ///
    /// An existing `(product, variant)` line is incremented, otherwise a
    /// line is appended. Applied to memory and the local store before the
    /// call returns; a remote `add` is queued when authenticated.
    pub fn add_line(&self, product_id: ProductId, quantity: u32, variant: VariantLabel) {
        if quantity == 0 {
            return;
        }

        {
            let mut state = self.lock_state();
            state.upsert(CartLine::new(product_id.clone(), quantity, variant));
            self.persist_and_publish(&state);
        }

        if self.is_authenticated() {
            self.inner.sync.enqueue(SyncOp::Add {
                product_id,
                quantity,
            });
        }
    }

    /// Remove the line with the given key.
    pub fn remove_line(&self, key: &LineKey) {
        let removed = {
            let mut state = self.lock_state();
            let removed = state.remove(key);
            if removed {
                self.persist_and_publish(&state);
            }
            removed
        };

        if removed && self.is_authenticated() {
            self.inner.sync.enqueue(SyncOp::Remove {
                product_id: key.product_id.clone(),
            });
        }
    }

    /// Overwrite the quantity of the line with the given key.
    ///
    /// A quantity of zero is equivalent to [`Self::remove_line`].
    pub fn update_quantity(&self, key: &LineKey, quantity: u32) {
        if quantity == 0 {
            self.remove_line(key);
            return;
        }

        let changed = {
            let mut state = self.lock_state();
            let changed = state.set_quantity(key, quantity);
            if changed {
                self.persist_and_publish(&state);
            }
            changed
        };

        if changed && self.is_authenticated() {
            self.inner.sync.enqueue(SyncOp::Update {
                product_id: key.product_id.clone(),
                quantity,
            });
        }
    }

    /// Empty the cart in memory and locally.
    pub fn clear(&self) {
        {
            let mut state = self.lock_state();
            state.clear();
            self.persist_and_publish(&state);
        }

        if self.is_authenticated() {
            self.inner.sync.enqueue(SyncOp::Clear);
        }
    }

    // =========================================================================
    // Reads exposed to the UI
    // =========================================================================

    /// The current cart lines, in order.
    #[must_use]
    pub fn items(&self) -> Vec<CartLine> {
        self.lock_state().lines().to_vec()
    }

    /// Totals derived from the current cart and the catalog.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        derive_totals(&self.lock_state(), self.inner.catalog.as_ref())
    }

    /// Catalog lookup passthrough for rendering.
    #[must_use]
    pub fn get_product(&self, id: &ProductId) -> Option<Product> {
        self.inner.catalog.product(id)
    }

    /// Whether the sign-in merge fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::SeqCst)
    }

    /// Subscribe to the total item count (header badge). The receiver sees
    /// the count republished after every mutation.
    #[must_use]
    pub fn subscribe_items(&self) -> watch::Receiver<u32> {
        self.inner.badge.subscribe()
    }

    /// Wait for every queued remote op to be attempted.
    ///
    /// For graceful teardown and tests; normal operation never waits.
    pub async fn flush_sync(&self) {
        self.inner.sync.flush().await;
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lock_state(&self) -> MutexGuard<'_, CartState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn is_authenticated(&self) -> bool {
        self.inner
            .identity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Re-serialize the full state to the local store and republish the
    /// item count. Store failures are logged; the store is a cache, not
    /// the system of record.
    fn persist_and_publish(&self, state: &CartState) {
        if let Err(e) = self.inner.store.save(state) {
            warn!(error = %e, "failed to persist local cart");
        }
        let _ = self.inner.badge.send(state.total_items());
    }
}

/// Pure totals derivation over a cart state and the catalog.
fn derive_totals(state: &CartState, catalog: &dyn CatalogProvider) -> CartTotals {
    let subtotal = state
        .lines()
        .iter()
        .filter_map(|line| {
            catalog
                .product(&line.product_id)
                .map(|p| p.price.amount * Decimal::from(line.quantity))
        })
        .sum();

    CartTotals {
        total_items: state.total_items(),
        subtotal,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use rindhouse_core::{CurrencyCode, Price};

    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::error::RemoteCartError;
    use crate::remote::RemoteCartLine;
    use crate::store::MemoryStore;

    /// Remote that answers every call successfully with an empty cart.
    struct QuietRemote;

    #[async_trait]
    impl RemoteCart for QuietRemote {
        async fn fetch(&self) -> Result<Vec<RemoteCartLine>, RemoteCartError> {
            Ok(Vec::new())
        }
        async fn add(&self, _: &ProductId, _: u32) -> Result<(), RemoteCartError> {
            Ok(())
        }
        async fn update(&self, _: &ProductId, _: u32) -> Result<(), RemoteCartError> {
            Ok(())
        }
        async fn remove(&self, _: &ProductId) -> Result<(), RemoteCartError> {
            Ok(())
        }
        async fn clear(&self) -> Result<(), RemoteCartError> {
            Ok(())
        }
    }

    fn catalog() -> Arc<StaticCatalog> {
        Arc::new(StaticCatalog::new([
            Product {
                id: ProductId::new("a"),
                name: "Aged Gouda".to_owned(),
                price: Price::new(Decimal::from(100), CurrencyCode::USD),
                variants: Vec::new(),
                available: true,
            },
            Product {
                id: ProductId::new("b"),
                name: "Cave Blue".to_owned(),
                price: Price::new(Decimal::from(50), CurrencyCode::USD),
                variants: Vec::new(),
                available: true,
            },
        ]))
    }

    fn guest_cart() -> SessionCart {
        SessionCart::new(catalog(), Arc::new(MemoryStore::new()), Arc::new(QuietRemote))
    }

    fn key(product: &str) -> LineKey {
        LineKey::new(ProductId::new(product), VariantLabel::default())
    }

    #[tokio::test]
    async fn test_add_line_merges_same_key() {
        let cart = guest_cart();
        cart.add_line(ProductId::new("a"), 2, VariantLabel::default());
        cart.add_line(ProductId::new("a"), 3, VariantLabel::default());

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_add_line_zero_quantity_is_noop() {
        let cart = guest_cart();
        cart.add_line(ProductId::new("a"), 0, VariantLabel::default());
        assert!(cart.items().is_empty());
    }

    #[tokio::test]
    async fn test_update_quantity_zero_removes() {
        let cart = guest_cart();
        cart.add_line(ProductId::new("a"), 2, VariantLabel::default());
        cart.update_quantity(&key("a"), 0);
        assert!(cart.items().is_empty());
    }

    #[tokio::test]
    async fn test_totals_skip_products_missing_from_catalog() {
        let cart = guest_cart();
        cart.add_line(ProductId::new("a"), 2, VariantLabel::default());
        cart.add_line(ProductId::new("discontinued"), 4, VariantLabel::default());

        let totals = cart.totals();
        // Unknown product still counts as items, but prices at zero.
        assert_eq!(totals.total_items, 6);
        assert_eq!(totals.subtotal, Decimal::from(200));
    }

    #[tokio::test]
    async fn test_subtotal_and_item_count() {
        let cart = guest_cart();
        cart.add_line(ProductId::new("a"), 2, VariantLabel::default());
        cart.add_line(ProductId::new("b"), 1, VariantLabel::default());

        let totals = cart.totals();
        assert_eq!(totals.total_items, 3);
        assert_eq!(totals.subtotal, Decimal::from(250));
    }

    #[tokio::test]
    async fn test_badge_republishes_on_mutation() {
        let cart = guest_cart();
        let badge = cart.subscribe_items();
        assert_eq!(*badge.borrow(), 0);

        cart.add_line(ProductId::new("a"), 2, VariantLabel::default());
        assert_eq!(*badge.borrow(), 2);

        cart.clear();
        assert_eq!(*badge.borrow(), 0);
    }

    #[tokio::test]
    async fn test_initialize_reads_persisted_cart() {
        let store = Arc::new(MemoryStore::new());
        store
            .save(&CartState::from_lines([CartLine::new(
                ProductId::new("a"),
                3,
                VariantLabel::default(),
            )]))
            .unwrap();

        let cart = SessionCart::new(catalog(), store, Arc::new(QuietRemote));
        assert_eq!(cart.totals().total_items, 3);
        assert!(!cart.is_loading());
    }

    #[tokio::test]
    async fn test_unauthenticated_identity_counts_as_absent() {
        let cart = guest_cart();
        cart.add_line(ProductId::new("a"), 1, VariantLabel::default());

        // Empty token: treated as absent, so no sign-in merge (and no
        // sign-out erasure, since nothing was present before).
        cart.identity_changed(Some(Identity::new(rindhouse_core::CustomerId::new("c"), "")))
            .await;
        assert_eq!(cart.items().len(), 1);
    }
}
