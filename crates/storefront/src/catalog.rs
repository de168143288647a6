//! Catalog provider boundary.
//!
//! The catalog is an external collaborator; the storefront only needs
//! synchronous metadata lookups for pricing and display. Products missing
//! from the catalog are not an error - they contribute nothing to totals
//! and are skipped when rendering.

use std::collections::HashMap;
use std::path::Path;

use rindhouse_core::{Product, ProductId};

use crate::error::CatalogError;

/// Source of product metadata (price, name, availability).
pub trait CatalogProvider: Send + Sync {
    /// Look up a product. `None` when the catalog does not know the id.
    fn product(&self, id: &ProductId) -> Option<Product>;
}

/// In-memory catalog built from a static product list.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: HashMap<ProductId, Product>,
}

impl StaticCatalog {
    /// Build a catalog from a product list. Later duplicates of an id win.
    #[must_use]
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect(),
        }
    }

    /// Parse a catalog from a JSON product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a valid product list.
    pub fn from_json(data: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(data)?;
        Ok(Self::new(products))
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl CatalogProvider for StaticCatalog {
    fn product(&self, id: &ProductId) -> Option<Product> {
        self.products.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use rindhouse_core::{CurrencyCode, Price};
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, dollars: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_owned(),
            price: Price::new(Decimal::from(dollars), CurrencyCode::USD),
            variants: Vec::new(),
            available: true,
        }
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let catalog = StaticCatalog::new([product("aged-gouda", 24)]);

        let found = catalog.product(&ProductId::new("aged-gouda"));
        assert_eq!(found.map(|p| p.price.amount), Some(Decimal::from(24)));
        assert!(catalog.product(&ProductId::new("retired-cheddar")).is_none());
    }

    #[test]
    fn test_from_json() {
        let catalog = StaticCatalog::from_json(
            r#"[
                {"id":"cave-blue","name":"Cave Blue","price":{"amount":"18.50","currency_code":"USD"},"variants":["wedge","half-wheel"]},
                {"id":"brie-fermier","name":"Brie Fermier","price":{"amount":"12.00","currency_code":"USD"},"available":false}
            ]"#,
        )
        .expect("valid catalog");

        assert_eq!(catalog.len(), 2);
        let blue = catalog.product(&ProductId::new("cave-blue")).expect("cave-blue");
        assert_eq!(blue.variants.len(), 2);
        let brie = catalog.product(&ProductId::new("brie-fermier")).expect("brie");
        assert!(!brie.available);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(StaticCatalog::from_json("not json").is_err());
    }
}
