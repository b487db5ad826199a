//! In-memory storage backend.
//!
//! Dev-mode and test backend. Entries carry an optional expiry and are
//! purged lazily on access; a `BTreeMap` per namespace keeps keys ordered
//! for prefix listing.

use crate::errors::Result;
use crate::traits::KvStore;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// In-memory `KvStore` backend.
pub struct MemoryStore {
    namespaces: RwLock<HashMap<String, BTreeMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get_raw(&self, ns: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        {
            let namespaces = self.namespaces.read().await;
            match namespaces.get(ns).and_then(|entries| entries.get(key)) {
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Lazily drop the expired entry.
        let mut namespaces = self.namespaces.write().await;
        if let Some(entries) = namespaces.get_mut(ns) {
            if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
                entries.remove(key);
            }
        }
        Ok(None)
    }

    async fn put_raw(
        &self,
        ns: &str,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        let mut namespaces = self.namespaces.write().await;
        namespaces
            .entry(ns.to_string())
            .or_default()
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, ns: &str, key: &str) -> Result<()> {
        let mut namespaces = self.namespaces.write().await;
        if let Some(entries) = namespaces.get_mut(ns) {
            entries.remove(key);
        }
        Ok(())
    }

    async fn list_keys(&self, ns: &str, prefix: &str, limit: usize) -> Result<Vec<String>> {
        let now = Instant::now();
        let namespaces = self.namespaces.read().await;
        let mut keys = Vec::new();

        if let Some(entries) = namespaces.get(ns) {
            for (key, entry) in entries.range(prefix.to_string()..) {
                if !key.starts_with(prefix) {
                    break;
                }
                if entry.is_expired(now) {
                    continue;
                }
                keys.push(key.clone());
                if keys.len() >= limit {
                    break;
                }
            }
        }

        Ok(keys)
    }
}
