//! Error types for the storefront's collaborator boundaries.
//!
//! Errors here never reach the shopper: the session cart swallows them
//! (with a log line) and keeps trusting its local state.

use thiserror::Error;

/// Errors from the remote cart resource.
#[derive(Debug, Error)]
pub enum RemoteCartError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The resource answered with a non-success status.
    #[error("{operation} returned status {status}")]
    Status {
        operation: &'static str,
        status: u16,
    },

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot be joined with an endpoint path.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Errors from the local persisted cart store.
///
/// Only `save`/`clear` report errors; a load that fails for any reason is
/// treated as "no persisted cart" by design.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors loading the static catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
