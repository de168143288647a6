//! Rindhouse Core - Shared types library.
//!
//! This crate provides common types used across all Rindhouse components:
//! - `storefront` - Session cart services for the public shop
//! - `integration-tests` - End-to-end reconciler scenarios
//!
//! # Architecture
//!
//! The core crate contains only types and pure cart-state rules - no I/O,
//! no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, catalog products, and cart state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
