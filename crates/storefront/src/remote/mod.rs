//! Remote cart resource, consumed as a plain REST collaborator.
//!
//! The contract is deliberately thin: `GET cart` returns the line list,
//! and the four mutations (`add`, `update`, `remove`, `clear`) guarantee
//! nothing beyond success or failure. The session cart treats every call
//! as best-effort - failures are logged and local state stands.

mod http;

pub use http::HttpCartClient;

use async_trait::async_trait;
use rindhouse_core::{CartLine, ProductId, VariantLabel};
use serde::{Deserialize, Serialize};

use crate::error::RemoteCartError;

/// One line of the server-side cart.
///
/// The wire shape carries no variant (the resource is variant-blind) and
/// may grow fields we do not know about; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantLabel>,
}

impl RemoteCartLine {
    /// Convert into a session cart line, defaulting the variant label when
    /// the resource omitted it.
    #[must_use]
    pub fn into_cart_line(self) -> CartLine {
        CartLine::new(
            self.product_id,
            self.quantity,
            self.variant.unwrap_or_default(),
        )
    }
}

/// The remote cart resource boundary.
///
/// Object-safe so tests can inject a recording fake behind `Arc<dyn _>`.
#[async_trait]
pub trait RemoteCart: Send + Sync {
    /// Fetch the current server-side cart lines.
    async fn fetch(&self) -> Result<Vec<RemoteCartLine>, RemoteCartError>;

    /// Add a quantity of a product to the server-side cart.
    async fn add(&self, product_id: &ProductId, quantity: u32) -> Result<(), RemoteCartError>;

    /// Overwrite the server-side quantity of a product.
    async fn update(&self, product_id: &ProductId, quantity: u32) -> Result<(), RemoteCartError>;

    /// Remove a product from the server-side cart.
    async fn remove(&self, product_id: &ProductId) -> Result<(), RemoteCartError>;

    /// Empty the server-side cart.
    async fn clear(&self) -> Result<(), RemoteCartError>;
}
