//! Local persisted cart copy.
//!
//! A single key holding the serialized `CartState`: read once at startup,
//! rewritten in full on every mutation, erased on sign-out. It is a cache
//! of the session cart, never the system of record once the shopper is
//! authenticated - so a load that fails for any reason simply yields no
//! cart.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use rindhouse_core::CartState;
use tracing::debug;

use crate::error::StoreError;

/// The browser-local (here: host-local) persisted cart copy.
pub trait CartStore: Send + Sync {
    /// Read the persisted cart. Absent or malformed data is `None` - never
    /// an error.
    fn load(&self) -> Option<CartState>;

    /// Persist the full cart state, replacing any previous copy.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    fn save(&self, state: &CartState) -> Result<(), StoreError>;

    /// Erase the persisted copy entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the erase fails (a missing copy is not an error).
    fn clear(&self) -> Result<(), StoreError>;
}

/// Cart store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store at the given path. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CartStore for JsonFileStore {
    fn load(&self) -> Option<CartState> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    debug!(path = %self.path.display(), error = %e, "cart file unreadable; starting empty");
                }
                return None;
            }
        };

        match serde_json::from_str(&data) {
            Ok(state) => Some(state),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "cart file malformed; starting empty");
                None
            }
        }
    }

    fn save(&self, state: &CartState) -> Result<(), StoreError> {
        let data = serde_json::to_string(state)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory cart store for guests without durable storage and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Option<CartState>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStore for MemoryStore {
    fn load(&self) -> Option<CartState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn save(&self, state: &CartState) -> Result<(), StoreError> {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(state.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rindhouse_core::{CartLine, ProductId, VariantLabel};

    use super::*;

    fn temp_store() -> JsonFileStore {
        let path = std::env::temp_dir().join(format!("rindhouse-cart-{}.json", uuid::Uuid::new_v4()));
        JsonFileStore::new(path)
    }

    fn sample_state() -> CartState {
        CartState::from_lines([CartLine::new(
            ProductId::new("aged-gouda"),
            2,
            VariantLabel::from("250g"),
        )])
    }

    #[test]
    fn test_load_missing_file_is_none() {
        assert!(temp_store().load().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let store = temp_store();
        let state = sample_state();

        store.save(&state).unwrap();
        assert_eq!(store.load(), Some(state));

        store.clear().unwrap();
    }

    #[test]
    fn test_malformed_file_loads_as_none() {
        let store = temp_store();
        std::fs::write(&store.path, "{not valid json").unwrap();

        assert!(store.load().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = temp_store();
        store.save(&sample_state()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_memory_store_roundtrip_and_clear() {
        let store = MemoryStore::new();
        assert!(store.load().is_none());

        store.save(&sample_state()).unwrap();
        assert_eq!(store.load(), Some(sample_state()));

        store.clear().unwrap();
        assert!(store.load().is_none());
    }
}
