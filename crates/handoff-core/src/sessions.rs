//! Session registry: sender-side lifecycle over delivered shares.
//!
//! Callers must authenticate the admin user before invoking the owner
//! operations; ownership (`session.sender == admin`) is enforced here.
//! Revoke and restore may interleave; each write is last-writer-wins and the
//! recipient-side truth is the inbox ordering at poll time.

use crate::errors::{Result, ServiceError};
use crate::inbox::InboxService;
use crate::types::{now, secs_until, to_rfc3339, DeliveryKind, SessionRecord, MIN_TTL_SEC};
use handoff_storage::keyspace::{
    sender_index_key, sender_index_prefix, NS_SESSIONS, NS_SESSIONS_BY_SENDER,
};
use handoff_storage::{KvStore, KvStoreExt};
use std::sync::Arc;
use std::time::Duration;

pub const LIST_LIMIT_MAX: usize = 100;
pub const LIST_LIMIT_DEFAULT: usize = 50;

pub struct SessionRegistry<S: KvStore + ?Sized> {
    storage: Arc<S>,
    inbox: Arc<InboxService<S>>,
}

impl<S: KvStore + ?Sized> SessionRegistry<S> {
    pub fn new(storage: Arc<S>, inbox: Arc<InboxService<S>>) -> Self {
        Self { storage, inbox }
    }

    /// List a sender's sessions via the sender index, skipping pairs whose
    /// record lapsed between list and get.
    pub async fn list(&self, sender: &str, limit: Option<usize>) -> Result<Vec<SessionRecord>> {
        let limit = limit.unwrap_or(LIST_LIMIT_DEFAULT).clamp(1, LIST_LIMIT_MAX);

        let prefix = sender_index_prefix(sender);
        let keys = self
            .storage
            .list_keys(NS_SESSIONS_BY_SENDER, &prefix, limit)
            .await?;

        let mut sessions = Vec::with_capacity(keys.len());
        for key in keys {
            let session_id = &key[prefix.len()..];
            if let Some(session) = self
                .storage
                .get::<SessionRecord>(NS_SESSIONS, session_id)
                .await?
            {
                sessions.push(session);
            }
        }

        Ok(sessions)
    }

    async fn load_owned(&self, admin: &str, session_id: &str) -> Result<SessionRecord> {
        let session: SessionRecord = self
            .storage
            .get(NS_SESSIONS, session_id)
            .await?
            .ok_or_else(|| ServiceError::SessionNotFound(session_id.to_string()))?;

        if session.sender != admin {
            return Err(ServiceError::NotSessionOwner);
        }

        Ok(session)
    }

    /// Push a revoke control message to the recipient and stamp the record.
    pub async fn revoke(&self, admin: &str, session_id: &str) -> Result<()> {
        let mut session = self.load_owned(admin, session_id).await?;

        // Floored so an almost-expired session still delivers the revoke.
        let ttl_left = secs_until(&session.expires_at).max(MIN_TTL_SEC as i64) as u64;
        self.inbox
            .push_for_session(&session, DeliveryKind::Revoke, ttl_left)
            .await?;

        session.revoked_at = Some(to_rfc3339(now()));
        self.storage
            .put(
                NS_SESSIONS,
                session_id,
                &session,
                Some(Duration::from_secs(ttl_left)),
            )
            .await?;

        tracing::info!(session_id = %session_id, sender = %admin, "Session revoked");

        Ok(())
    }

    /// Re-enqueue the retained cipher as a fresh share delivery.
    pub async fn restore(&self, admin: &str, session_id: &str) -> Result<()> {
        let mut session = self.load_owned(admin, session_id).await?;

        let ttl_left = secs_until(&session.expires_at);
        if ttl_left <= MIN_TTL_SEC as i64 {
            return Err(ServiceError::SessionExpired);
        }
        if session.cipher.is_empty() {
            return Err(ServiceError::SessionCipherMissing);
        }

        let ttl_left = ttl_left as u64;
        self.inbox
            .push_for_session(&session, DeliveryKind::Share, ttl_left)
            .await?;

        session.restored_at = Some(to_rfc3339(now()));
        self.storage
            .put(
                NS_SESSIONS,
                session_id,
                &session,
                Some(Duration::from_secs(ttl_left)),
            )
            .await?;

        tracing::info!(session_id = %session_id, sender = %admin, "Session restored");

        Ok(())
    }

    /// Recipient-side acceptance receipt; idempotent and unauthenticated.
    /// Only advances a timestamp.
    pub async fn accepted(&self, session_id: &str) -> Result<()> {
        let mut session: SessionRecord = self
            .storage
            .get(NS_SESSIONS, session_id)
            .await?
            .ok_or_else(|| ServiceError::SessionNotFound(session_id.to_string()))?;

        if session.accepted_at.is_some() {
            return Ok(());
        }

        session.accepted_at = Some(to_rfc3339(now()));
        let ttl_left = secs_until(&session.expires_at).max(MIN_TTL_SEC as i64) as u64;
        self.storage
            .put(
                NS_SESSIONS,
                session_id,
                &session,
                Some(Duration::from_secs(ttl_left)),
            )
            .await?;

        Ok(())
    }

    /// Remove the record and its sender index entry.
    pub async fn delete(&self, admin: &str, session_id: &str) -> Result<()> {
        let session = self.load_owned(admin, session_id).await?;

        self.storage.delete(NS_SESSIONS, session_id).await?;
        self.storage
            .delete(
                NS_SESSIONS_BY_SENDER,
                &sender_index_key(&session.sender, session_id),
            )
            .await?;

        tracing::info!(session_id = %session_id, sender = %admin, "Session deleted");

        Ok(())
    }
}
