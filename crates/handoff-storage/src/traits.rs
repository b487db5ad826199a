//! Storage trait definitions.

use crate::errors::{Result, StorageError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Key-value storage interface with per-entry TTL.
///
/// The raw byte methods keep the trait object-safe so backends can be shared
/// as `Arc<dyn KvStore>`; use [`KvStoreExt`] for typed access. Expired
/// entries are indistinguishable from absent ones.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get the raw value for a key, or `None` if absent or expired.
    async fn get_raw(&self, ns: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Put a raw value. `ttl = None` stores the entry without expiry.
    async fn put_raw(
        &self,
        ns: &str,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, ns: &str, key: &str) -> Result<()>;

    /// List live keys starting with `prefix`, in lexicographic order, up to
    /// `limit` entries.
    async fn list_keys(&self, ns: &str, prefix: &str, limit: usize) -> Result<Vec<String>>;
}

/// Typed extension methods over [`KvStore`].
///
/// Values are stored as JSON documents; the records carry arbitrary
/// client-supplied JSON (public keys, share metadata) that a self-describing
/// format handles directly.
#[async_trait]
pub trait KvStoreExt: KvStore {
    /// Get and deserialize a value.
    async fn get<V>(&self, ns: &str, key: &str) -> Result<Option<V>>
    where
        V: DeserializeOwned,
    {
        match self.get_raw(ns, key).await? {
            Some(bytes) => Ok(Some(deserialize_value(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Serialize and put a value.
    async fn put<V>(&self, ns: &str, key: &str, value: &V, ttl: Option<Duration>) -> Result<()>
    where
        V: Serialize + Sync,
    {
        let bytes = serialize_value(value)?;
        self.put_raw(ns, key, bytes, ttl).await
    }

    /// Whether a live entry exists for the key.
    async fn exists(&self, ns: &str, key: &str) -> Result<bool> {
        Ok(self.get_raw(ns, key).await?.is_some())
    }
}

/// Automatically implement KvStoreExt for all types that implement KvStore
impl<T: KvStore + ?Sized> KvStoreExt for T {}

/// Helper function to serialize a value
pub(crate) fn serialize_value<V: Serialize>(value: &V) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Helper function to deserialize a value
pub(crate) fn deserialize_value<V: DeserializeOwned>(bytes: &[u8]) -> Result<V> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::Deserialization(e.to_string()))
}
