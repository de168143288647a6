//! Rindhouse Storefront - session cart services.
//!
//! This crate owns the session cart reconciler: the component that keeps
//! the shopper's in-memory cart consistent with a browser-local persisted
//! copy and, once the shopper signs in, with the remote cart resource.
//!
//! # Architecture
//!
//! - [`services::SessionCart`] - the reconciler, an explicitly constructed
//!   service object injected into consumers
//! - [`catalog`] - product metadata lookups (price, name, availability)
//! - [`store`] - the single-key local persisted cart copy
//! - [`remote`] - the remote cart REST resource
//! - [`sync`] - outbound best-effort queue mirroring local mutations
//!
//! The local cart is authoritative for the session: remote failures are
//! logged and never surface to the shopper.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;
pub mod remote;
pub mod services;
pub mod store;
pub mod sync;
