//! Key-value storage for shop state.
//!
//! Storage is string-keyed and string-valued with best-effort durability.
//! Two implementations are provided:
//!
//! - [`FileStorage`] - one file per key in a data directory (durable)
//! - [`MemoryStorage`] - a map held in memory (cleared on restart)
//!
//! The shop keeps `cart` and `lastOrder` in durable storage and the
//! `isLoggedIn` flag in memory, mirroring local vs. session storage.
//!
//! Values are JSON. [`load_json`] treats an unparseable value as absent so a
//! corrupted record resets to its default instead of failing the caller.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys.
pub mod keys {
    /// Serialized cart.
    pub const CART: &str = "cart";

    /// Most recent order record.
    pub const LAST_ORDER: &str = "lastOrder";

    /// Session flag set on login (`"1"` when present).
    pub const IS_LOGGED_IN: &str = "isLoggedIn";
}

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A string key-value store.
pub trait Storage: Send + Sync {
    /// Read a value. `Ok(None)` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and parse a JSON value.
///
/// Returns `None` when the key is absent, unreadable or holds a value that does
/// not parse as `T`. Corruption is logged and never propagated.
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read from storage");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding corrupted stored value");
            None
        }
    }
}

/// Serialize a value as JSON and write it.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_json<T: Serialize + ?Sized>(
    storage: &dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    storage.set(key, &json)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_load_json_missing_is_none() {
        let storage = MemoryStorage::new();
        assert!(load_json::<BTreeMap<String, u32>>(&storage, "absent").is_none());
    }

    #[test]
    fn test_load_json_corrupted_is_none() {
        let storage = MemoryStorage::new();
        storage.set(keys::CART, "{not json").unwrap();
        assert!(load_json::<BTreeMap<String, u32>>(&storage, keys::CART).is_none());

        storage.set(keys::CART, "[1,2,3]").unwrap();
        assert!(load_json::<BTreeMap<String, u32>>(&storage, keys::CART).is_none());
    }

    #[test]
    fn test_save_then_load() {
        let storage = MemoryStorage::new();
        let mut value = BTreeMap::new();
        value.insert("a".to_string(), 1_u32);
        save_json(&storage, "k", &value).unwrap();
        assert_eq!(load_json::<BTreeMap<String, u32>>(&storage, "k"), Some(value));
    }
}
