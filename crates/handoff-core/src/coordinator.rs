//! Per-token coordination: serialized `init → status → consume` transitions.
//!
//! A sharded mutex map serializes every transition for a given token while
//! the token's state lives in the `share_tokens` namespace. `consumed` flips
//! false → true exactly once under any interleaving of concurrent callers;
//! the flag is persisted, so a consumed token keeps answering as consumed
//! until its TTL elapses.

use crate::errors::{Result, ServiceError};
use crate::types::{secs_until, TokenState};
use handoff_storage::keyspace::NS_SHARE_TOKENS;
use handoff_storage::{KvStore, KvStoreExt};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const SHARD_COUNT: usize = 64;

/// Externally observable state of a share token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// Never issued, or expired and collected.
    Unknown,
    /// Issued and not yet consumed.
    Live,
    /// Consumed; absorbing.
    Consumed,
}

pub struct TokenCoordinator<S: KvStore + ?Sized> {
    storage: Arc<S>,
    shards: Vec<Mutex<()>>,
}

impl<S: KvStore + ?Sized> TokenCoordinator<S> {
    pub fn new(storage: Arc<S>) -> Self {
        let shards = (0..SHARD_COUNT).map(|_| Mutex::new(())).collect();
        Self { storage, shards }
    }

    fn shard(&self, token: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARD_COUNT]
    }

    /// Load a token's state, treating anything past its expiry as gone even
    /// if the store has not purged it yet.
    async fn load_live(&self, token: &str) -> Result<Option<TokenState>> {
        let state: Option<TokenState> = self.storage.get(NS_SHARE_TOKENS, token).await?;
        Ok(state.filter(|s| secs_until(&s.expires_at) > 0))
    }

    /// Register a fresh token.
    pub async fn init(
        &self,
        token: &str,
        recipient: &str,
        expires_at: &str,
        ttl: Duration,
    ) -> Result<()> {
        let _guard = self.shard(token).lock().await;

        if self.load_live(token).await?.is_some() {
            return Err(ServiceError::TokenExists);
        }

        let state = TokenState {
            consumed: false,
            expires_at: expires_at.to_string(),
            recipient: recipient.to_string(),
        };
        self.storage
            .put(NS_SHARE_TOKENS, token, &state, Some(ttl))
            .await?;

        Ok(())
    }

    pub async fn status(&self, token: &str) -> Result<TokenStatus> {
        Ok(match self.load_live(token).await? {
            None => TokenStatus::Unknown,
            Some(state) if state.consumed => TokenStatus::Consumed,
            Some(_) => TokenStatus::Live,
        })
    }

    /// Atomically flip `consumed` for a live token.
    ///
    /// Exactly one of any set of concurrent callers succeeds; the rest see
    /// `ShareConsumed`.
    pub async fn consume(&self, token: &str) -> Result<()> {
        let _guard = self.shard(token).lock().await;

        let mut state = self
            .load_live(token)
            .await?
            .ok_or(ServiceError::ShareNotFound)?;
        if state.consumed {
            return Err(ServiceError::ShareConsumed);
        }

        state.consumed = true;
        // The entry lingers until the original expiry, answering as consumed.
        let remaining = secs_until(&state.expires_at).max(1) as u64;
        self.storage
            .put(
                NS_SHARE_TOKENS,
                token,
                &state,
                Some(Duration::from_secs(remaining)),
            )
            .await?;

        tracing::debug!(token = %token, "Share token consumed");

        Ok(())
    }
}
