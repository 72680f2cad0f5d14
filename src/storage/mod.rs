//! Key-value persistence module
//!
//! Timers and history are stored wholesale as JSON documents under fixed keys.
//! Every save overwrites the whole document.

pub mod file_store;
pub mod memory_store;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::StorageError;

// Re-export main types
pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// Storage key holding the full timer collection
pub const TIMERS_KEY: &str = "timers";
/// Storage key holding the full completion history
pub const HISTORY_KEY: &str = "history";

/// Minimal string key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`, `None` if nothing was stored yet
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Serialize `value` as JSON and store it under `key`
pub fn save_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}

/// Read and parse the JSON document stored under `key`
pub fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })
}
