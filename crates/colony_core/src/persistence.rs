//! Save/restore of the full game state under one storage key.
//!
//! The state is stored as a JSON string. There is no format version: a
//! payload that no longer deserializes is reported by [`PersistenceAdapter::load`]
//! and replaced by a fresh game in [`PersistenceAdapter::restore_or_default`].

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{info, warn};

use crate::simulation::GameState;

/// Storage key used unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "colony-sim-state";

/// Error type for save/restore operations.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The backing store failed.
    #[error("Storage I/O failed for key '{key}': {source}")]
    Io {
        /// Storage key being accessed.
        key: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The state could not be encoded.
    #[error("Failed to encode game state: {0}")]
    Encode(#[source] serde_json::Error),

    /// The stored payload is not a valid game state.
    #[error("Failed to decode stored game state: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Key/value storage for serialized state.
pub trait StateStore {
    /// Payload stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Replace the payload under `key`.
    fn write(&mut self, key: &str, payload: &str) -> Result<(), PersistenceError>;

    /// Delete the payload under `key`. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// In-memory store, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw payload under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl StateStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, payload: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Serializes [`GameState`] into a [`StateStore`] under a fixed key.
#[derive(Debug)]
pub struct PersistenceAdapter<S> {
    store: S,
    key: String,
}

impl<S: StateStore> PersistenceAdapter<S> {
    /// Adapter using [`DEFAULT_STORAGE_KEY`].
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    /// Adapter using a custom key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Storage key in use.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Backing store, mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Write `state` under the key.
    pub fn save(&mut self, state: &GameState) -> Result<(), PersistenceError> {
        let payload = serde_json::to_string(state).map_err(PersistenceError::Encode)?;
        self.store.write(&self.key, &payload)
    }

    /// Read the stored state, if there is one.
    pub fn load(&self) -> Result<Option<GameState>, PersistenceError> {
        let Some(payload) = self.store.read(&self.key)? else {
            return Ok(None);
        };
        serde_json::from_str(&payload)
            .map(Some)
            .map_err(PersistenceError::Decode)
    }

    /// Stored state, or a fresh game if nothing usable is stored.
    pub fn restore_or_default(&self, now: u64) -> GameState {
        match self.load() {
            Ok(Some(state)) => {
                info!(key = %self.key, planets = state.planets.len(), "Restored saved game");
                state
            }
            Ok(None) => {
                info!(key = %self.key, "No saved game, starting fresh");
                GameState::new(now)
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Saved game unusable, starting fresh");
                GameState::new(now)
            }
        }
    }

    /// Delete the stored state.
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.store.remove(&self.key)
    }
}
