use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::CoreError;

use super::kv::KeyValueStore;

/// High-level snapshot operations: JSON in and out of a [`KeyValueStore`].
pub struct StorageManager;

impl StorageManager {
    /// Read and deserialize the snapshot under `key`.
    ///
    /// Fails soft: an absent key, an unreadable store or malformed JSON all
    /// yield `T::default()`. The failure is logged, never returned.
    pub fn load_or_default<T, S>(store: &S, key: &str) -> T
    where
        T: DeserializeOwned + Default,
        S: KeyValueStore + ?Sized,
    {
        let raw = match store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "no snapshot stored, starting empty");
                return T::default();
            }
            Err(e) => {
                warn!(key, error = %e, "snapshot unreadable, starting empty");
                return T::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "malformed snapshot treated as no data");
                T::default()
            }
        }
    }

    /// Serialize `value` and write it under `key` in one call.
    pub fn save<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), CoreError>
    where
        T: Serialize + ?Sized,
        S: KeyValueStore + ?Sized,
    {
        let json = serde_json::to_string(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize '{key}': {e}")))?;
        store.set(key, &json)?;
        debug!(key, bytes = json.len(), "snapshot written");
        Ok(())
    }

    /// Delete the snapshot under `key`. A later load returns the default.
    pub fn clear<S>(store: &mut S, key: &str) -> Result<(), CoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        store.remove(key)
    }
}
