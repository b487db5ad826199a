//! RocksDB storage backend.
//!
//! One column family per namespace. RocksDB has no per-entry TTL, so every
//! value is wrapped in an [`Envelope`] carrying its expiry; expired envelopes
//! read as absent and are deleted lazily.

use crate::errors::{Result, StorageError};
use crate::keyspace::all_namespaces;
use crate::traits::KvStore;
use async_trait::async_trait;
use rocksdb::{Options, DB};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Stored wrapper carrying the entry's expiry.
#[derive(Serialize, Deserialize)]
struct Envelope {
    expires_at_ms: Option<i64>,
    value: Vec<u8>,
}

impl Envelope {
    fn is_expired(&self, now_ms: i64) -> bool {
        matches!(self.expires_at_ms, Some(at) if at <= now_ms)
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn encode_envelope(envelope: &Envelope) -> Result<Vec<u8>> {
    bincode::serialize(envelope).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn decode_envelope(bytes: &[u8]) -> Result<Envelope> {
    bincode::deserialize(bytes).map_err(|e| StorageError::Deserialization(e.to_string()))
}

/// RocksDB `KvStore` backend.
pub struct RocksDbStore {
    db: Arc<DB>,
}

impl RocksDbStore {
    /// Open the database at the specified path, creating all namespaces'
    /// column families if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let db = DB::open_cf(&opts, &path, all_namespaces())
            .map_err(|e| StorageError::Database(e.to_string()))?;

        debug!("Opened RocksDB at {:?}", path.as_ref());

        Ok(Self { db: Arc::new(db) })
    }

    fn cf_handle(&self, ns: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(ns)
            .ok_or_else(|| StorageError::InvalidNamespace(ns.to_string()))
    }
}

#[async_trait]
impl KvStore for RocksDbStore {
    async fn get_raw(&self, ns: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf_handle(ns)?;

        let bytes = self
            .db
            .get_cf(cf, key.as_bytes())
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let Some(bytes) = bytes else {
            return Ok(None);
        };

        let envelope = decode_envelope(&bytes)?;
        if envelope.is_expired(now_ms()) {
            self.db
                .delete_cf(cf, key.as_bytes())
                .map_err(|e| StorageError::Database(e.to_string()))?;
            return Ok(None);
        }

        Ok(Some(envelope.value))
    }

    async fn put_raw(
        &self,
        ns: &str,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let cf = self.cf_handle(ns)?;
        let envelope = Envelope {
            expires_at_ms: ttl.map(|ttl| now_ms() + ttl.as_millis() as i64),
            value,
        };

        self.db
            .put_cf(cf, key.as_bytes(), encode_envelope(&envelope)?)
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, ns: &str, key: &str) -> Result<()> {
        let cf = self.cf_handle(ns)?;

        self.db
            .delete_cf(cf, key.as_bytes())
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    async fn list_keys(&self, ns: &str, prefix: &str, limit: usize) -> Result<Vec<String>> {
        let cf = self.cf_handle(ns)?;
        let now = now_ms();
        let mut keys = Vec::new();

        // Seek to the prefix position; keys are sorted, so iteration stops at
        // the first non-matching key.
        let iter = self.db.iterator_cf(
            cf,
            rocksdb::IteratorMode::From(prefix.as_bytes(), rocksdb::Direction::Forward),
        );

        for item in iter {
            let (key, value) = item.map_err(|e| StorageError::Database(e.to_string()))?;

            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            if decode_envelope(&value)?.is_expired(now) {
                continue;
            }

            keys.push(String::from_utf8_lossy(&key).into_owned());
            if keys.len() >= limit {
                break;
            }
        }

        Ok(keys)
    }
}
