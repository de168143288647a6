//! Integration test support for Rindhouse.
//!
//! Provides in-memory fakes for the session cart's collaborators so the
//! reconciler scenarios can run without a network or a browser:
//!
//! - [`FakeRemoteCart`] - records every call, serves a programmable
//!   server-side cart, and can be told to fail fetches or mutations
//! - [`cheese_catalog`] - a small static catalog with known prices
//!
//! The local store fake is `rindhouse_storefront::store::MemoryStore`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use rindhouse_core::{CurrencyCode, Price, Product, ProductId};
use rindhouse_storefront::error::RemoteCartError;
use rindhouse_storefront::remote::{RemoteCart, RemoteCartLine};
use rust_decimal::Decimal;

/// A recorded call against the fake remote cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Fetch,
    Add { product_id: String, quantity: u32 },
    Update { product_id: String, quantity: u32 },
    Remove { product_id: String },
    Clear,
}

/// In-memory remote cart resource with call recording and programmable
/// failures.
#[derive(Default)]
pub struct FakeRemoteCart {
    server_lines: Mutex<Vec<RemoteCartLine>>,
    calls: Mutex<Vec<RemoteCall>>,
    fail_fetch: AtomicBool,
    fail_mutations: AtomicBool,
}

impl FakeRemoteCart {
    /// An empty, always-successful remote cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A remote cart pre-populated with server-side lines.
    #[must_use]
    pub fn with_lines(lines: impl IntoIterator<Item = (&'static str, u32)>) -> Self {
        let fake = Self::new();
        *fake.server_lines.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = lines
            .into_iter()
            .map(|(product, quantity)| RemoteCartLine {
                product_id: ProductId::new(product),
                quantity,
                variant: None,
            })
            .collect();
        fake
    }

    /// Make the next fetches fail with a 502.
    pub fn fail_fetch(&self) {
        self.fail_fetch.store(true, Ordering::SeqCst);
    }

    /// Make every mutation fail with a 503. Calls are still recorded.
    pub fn fail_mutations(&self) {
        self.fail_mutations.store(true, Ordering::SeqCst);
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// The mutation calls made so far (fetches filtered out).
    #[must_use]
    pub fn mutation_calls(&self) -> Vec<RemoteCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, RemoteCall::Fetch))
            .collect()
    }

    fn record(&self, call: RemoteCall) {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(call);
    }

    fn mutation_result(&self, operation: &'static str) -> Result<(), RemoteCartError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            Err(RemoteCartError::Status {
                operation,
                status: 503,
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteCart for FakeRemoteCart {
    async fn fetch(&self) -> Result<Vec<RemoteCartLine>, RemoteCartError> {
        self.record(RemoteCall::Fetch);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(RemoteCartError::Status {
                operation: "fetch",
                status: 502,
            });
        }
        Ok(self
            .server_lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    async fn add(&self, product_id: &ProductId, quantity: u32) -> Result<(), RemoteCartError> {
        self.record(RemoteCall::Add {
            product_id: product_id.to_string(),
            quantity,
        });
        self.mutation_result("add")
    }

    async fn update(&self, product_id: &ProductId, quantity: u32) -> Result<(), RemoteCartError> {
        self.record(RemoteCall::Update {
            product_id: product_id.to_string(),
            quantity,
        });
        self.mutation_result("update")
    }

    async fn remove(&self, product_id: &ProductId) -> Result<(), RemoteCartError> {
        self.record(RemoteCall::Remove {
            product_id: product_id.to_string(),
        });
        self.mutation_result("remove")
    }

    async fn clear(&self) -> Result<(), RemoteCartError> {
        self.record(RemoteCall::Clear);
        self.mutation_result("clear")
    }
}

/// A small catalog of Rindhouse cheeses with known prices.
///
/// - `a` / Aged Gouda: 100
/// - `b` / Cave Blue: 50
/// - `c` / Brie Fermier: 30
#[must_use]
pub fn cheese_catalog() -> rindhouse_storefront::catalog::StaticCatalog {
    let product = |id: &str, name: &str, dollars: i64| Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        price: Price::new(Decimal::from(dollars), CurrencyCode::USD),
        variants: Vec::new(),
        available: true,
    };

    rindhouse_storefront::catalog::StaticCatalog::new([
        product("a", "Aged Gouda", 100),
        product("b", "Cave Blue", 50),
        product("c", "Brie Fermier", 30),
    ])
}
