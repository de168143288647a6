//! Shared type definitions.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{CartLine, CartState, LineKey, MergeOutcome, VariantLabel};
pub use id::{CustomerId, ProductId};
pub use price::{CurrencyCode, Price};
pub use product::Product;
