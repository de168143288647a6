//! Catalog product shape.
//!
//! This is the contract the catalog provider exposes to the storefront;
//! the catalog itself (feed, CMS, admin tooling) is an external
//! collaborator.

use serde::{Deserialize, Serialize};

use crate::types::cart::VariantLabel;
use crate::types::id::ProductId;
use crate::types::price::Price;

/// A product as known to the catalog provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Offered variants (weight/size labels). Empty means single-variant.
    #[serde(default)]
    pub variants: Vec<VariantLabel>,
    /// Whether the product can currently be sold.
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}
