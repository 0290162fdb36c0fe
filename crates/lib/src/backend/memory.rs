//! In-memory key-value backend
//!
//! A `HashMap`-backed implementation of [`KeyValueStore`], suitable for
//! testing, development, or scenarios where durability is handled externally
//! by saving/loading the entire state to/from a file.

use std::{collections::HashMap, path::Path, sync::RwLock};

use serde::{Deserialize, Serialize};

use super::{KeyValueStore, errors::BackendError};
use crate::Result;

/// A simple in-memory key-value store using a `HashMap`.
///
/// Provides basic persistence via [`InMemory::save_to_file`] and
/// [`InMemory::load_from_file`], serializing the map to JSON.
#[derive(Debug, Default)]
pub struct InMemory {
    entries: RwLock<HashMap<String, String>>,
}

/// Serializable snapshot of the store for file persistence.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    entries: HashMap<String, String>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the keys currently present in the store.
    pub fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap();
        entries.keys().cloned().collect()
    }

    /// Saves the entire store to the given file as pretty-printed JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let entries = self.entries.read().unwrap().clone();
        let snapshot = Snapshot { entries };
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| BackendError::SerializationFailed { source: e })?;
        std::fs::write(path, json).map_err(|e| BackendError::FileIo { source: e }.into())
    }

    /// Loads a store from the given JSON file.
    ///
    /// A missing file yields a new, empty store; a present-but-corrupt file
    /// is an error so the caller can decide whether to start over.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let snapshot: Snapshot = serde_json::from_str(&json)
                    .map_err(|e| BackendError::DeserializationFailed { source: e })?;
                Ok(Self {
                    entries: RwLock::new(snapshot.entries),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(BackendError::FileIo { source: e }.into()),
        }
    }
}

impl KeyValueStore for InMemory {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        entries.remove(key);
        Ok(())
    }
}
