//! Session cart state and its pure transition rules.
//!
//! A cart is an ordered sequence of lines, at most one line per
//! `(product, variant)` key. All operations here are pure: persistence
//! and remote synchronization live in the storefront crate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A product variant label, e.g. a weight or size (`"250g"`, `"half-wheel"`).
///
/// Collaborators that do not speak variants (the remote cart resource)
/// map onto the default label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantLabel(String);

impl VariantLabel {
    /// Create a new variant label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Get the underlying label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VariantLabel {
    fn default() -> Self {
        Self("default".to_owned())
    }
}

impl From<&str> for VariantLabel {
    fn from(label: &str) -> Self {
        Self(label.to_owned())
    }
}

impl std::fmt::Display for VariantLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Uniqueness key of a cart line: `(product, variant)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub variant: VariantLabel,
}

impl LineKey {
    /// Create a new line key.
    #[must_use]
    pub const fn new(product_id: ProductId, variant: VariantLabel) -> Self {
        Self {
            product_id,
            variant,
        }
    }
}

/// One `(product, variant)` entry with a quantity in the session cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub variant: VariantLabel,
}

impl CartLine {
    /// Create a new cart line.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32, variant: VariantLabel) -> Self {
        Self {
            product_id,
            quantity,
            variant,
        }
    }

    /// The line's uniqueness key.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_id.clone(), self.variant.clone())
    }
}

/// Result of merging the local cart with the server cart at sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The reconciled cart: remote lines followed by local-only lines.
    pub merged: CartState,
    /// Local lines whose product the server cart did not know about.
    /// These must be pushed to the remote cart, one call per line.
    pub local_only: Vec<CartLine>,
}

/// Ordered cart state, owned exclusively by the current session.
///
/// Invariants: at most one line per `(product, variant)` key, and every
/// quantity is >= 1. The line list is private so the invariants cannot be
/// bypassed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from a sequence of lines, folding duplicate keys
    /// together and dropping zero-quantity lines.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut state = Self::new();
        for line in lines {
            state.upsert(line);
        }
        state
    }

    /// The lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total item count: the sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Whether any line references the given product, under any variant.
    #[must_use]
    pub fn contains_product(&self, product_id: &ProductId) -> bool {
        self.lines.iter().any(|l| &l.product_id == product_id)
    }

    /// Add a line. If a line with the same `(product, variant)` key exists,
    /// its quantity is incremented by the new line's quantity; otherwise the
    /// line is appended. Zero-quantity lines are ignored.
    pub fn upsert(&mut self, line: CartLine) {
        if line.quantity == 0 {
            return;
        }
        let key = line.key();
        if let Some(existing) = self.lines.iter_mut().find(|l| l.key() == key) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            self.lines.push(line);
        }
    }

    /// Overwrite the quantity of the line with the given key. A quantity of
    /// zero removes the line. Returns `true` if the cart changed.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(key);
        }
        match self.lines.iter_mut().find(|l| &l.key() == key) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove the line with the given key. Returns `true` if a line was
    /// removed.
    pub fn remove(&mut self, key: &LineKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.key() != key);
        self.lines.len() != before
    }

    /// Remove all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Merge this (local) cart with the server cart fetched at sign-in.
    ///
    /// Server lines take precedence for every product they mention; local
    /// lines for products the server does not know about survive and are
    /// reported back as `local_only` so the caller can push them. The
    /// merged order is server lines followed by the surviving local lines.
    ///
    /// The remote contract is keyed by product id alone (it carries no
    /// variant), so precedence is decided per product, not per line key.
    #[must_use]
    pub fn merge_remote(&self, remote: Vec<CartLine>) -> MergeOutcome {
        let remote_products: HashSet<&ProductId> =
            remote.iter().map(|l| &l.product_id).collect();

        let local_only: Vec<CartLine> = self
            .lines
            .iter()
            .filter(|l| !remote_products.contains(&l.product_id))
            .cloned()
            .collect();

        let merged = Self::from_lines(remote.into_iter().chain(local_only.iter().cloned()));

        MergeOutcome { merged, local_only }
    }
}
