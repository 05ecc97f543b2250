// src/store/mod.rs
// Durable key/value adapter backing rotation state, seen sets and repositories

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Byte-oriented persistence used by every stateful component.
///
/// `load` returns `Ok(None)` when the key has never been saved.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    async fn save(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

/// Load and decode a JSON value, `None` if the key is absent
pub async fn load_json<T>(store: &dyn DurableStore, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
{
    match store.load(key).await? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Serialization {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode a value as JSON and save it
pub async fn save_json<T>(store: &dyn DurableStore, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec(value).map_err(|source| StoreError::Serialization {
        key: key.to_string(),
        source,
    })?;
    store.save(key, &bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn test_json_helpers_roundtrip_through_store() {
        let store = MemoryStore::new();
        let missing: Option<Vec<u32>> = load_json(&store, "absent").await.unwrap();
        assert!(missing.is_none());

        let set: BTreeSet<String> = ["a".to_string(), "b".to_string()].into_iter().collect();
        save_json(&store, "set", &set).await.unwrap();

        let loaded: BTreeSet<String> = load_json(&store, "set").await.unwrap().unwrap();
        assert_eq!(loaded, set);
    }

    #[tokio::test]
    async fn test_load_json_reports_corrupt_value() {
        let store = MemoryStore::new();
        store.save("bad", b"not json").await.unwrap();

        let result: Result<Option<Vec<u32>>, _> = load_json(&store, "bad").await;
        match result {
            Err(StoreError::Serialization { key, .. }) => assert_eq!(key, "bad"),
            other => panic!("expected serialization error, got {:?}", other),
        }
    }
}
