//! Recipient inbox: push delivery, polling, acknowledgement.
//!
//! Items persist until the recipient acks them by id or their TTL elapses;
//! delivery is at-least-once and recipients deduplicate by id. Polling is
//! unauthenticated by design: confidentiality is carried end-to-end by the
//! cipher.

use crate::errors::{Result, ServiceError};
use crate::identity::{validate_username, DirectoryService};
use crate::shares::SharePayload;
use crate::tokens::new_delivery_id;
use crate::types::{
    expiry_after, now, to_rfc3339, DeliveryKind, InboxItem, InboxMeta, Limits, SessionRecord,
    DEFAULT_ALG,
};
use handoff_storage::keyspace::{
    inbox_key, inbox_prefix, sender_index_key, NS_INBOX, NS_SESSIONS, NS_SESSIONS_BY_SENDER,
};
use handoff_storage::{KvStore, KvStoreExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub const POLL_LIMIT_MAX: usize = 25;
pub const POLL_LIMIT_DEFAULT: usize = 10;

/// Result of enqueueing a share into an inbox.
#[derive(Debug)]
pub struct Delivered {
    pub id: String,
    pub session_id: String,
}

/// One polled inbox entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolledItem {
    pub id: String,
    pub cipher: String,
    pub alg: Option<String>,
    pub cmp: Option<String>,
    pub meta: InboxMeta,
    pub expires_at: String,
}

pub struct InboxService<S: KvStore + ?Sized> {
    storage: Arc<S>,
    directory: Arc<DirectoryService<S>>,
    limits: Limits,
}

impl<S: KvStore + ?Sized> InboxService<S> {
    pub fn new(storage: Arc<S>, directory: Arc<DirectoryService<S>>, limits: Limits) -> Self {
        Self {
            storage,
            directory,
            limits,
        }
    }

    /// Push a share into a recipient's inbox. When the metadata names a
    /// sender, a session record and sender index entry are written alongside
    /// so the sender can manage the delivery afterwards.
    pub async fn enqueue(&self, recipient: &str, payload: SharePayload) -> Result<Delivered> {
        validate_username(recipient)?;
        if payload.cipher.is_empty() {
            return Err(ServiceError::MissingField("cipher"));
        }
        self.limits.check_payload(&payload.cipher)?;
        let ttl_sec = self.limits.clamp_ttl(payload.ttl_sec);

        if !self.directory.user_exists(recipient).await? {
            return Err(ServiceError::RecipientNotFound(recipient.to_string()));
        }

        let id = new_delivery_id();
        let session_id = new_delivery_id();
        let created_at = to_rfc3339(now());
        let expires_at = expiry_after(ttl_sec);

        let meta_in = payload.meta.unwrap_or_default();
        let sender = meta_in.sender.clone().filter(|s| !s.is_empty());
        let alg = payload.alg.unwrap_or_else(|| DEFAULT_ALG.to_string());

        let item = InboxItem {
            cipher: payload.cipher.clone(),
            alg: Some(alg.clone()),
            cmp: payload.cmp.clone(),
            meta: InboxMeta {
                kind: DeliveryKind::Share,
                session_id: Some(session_id.clone()),
                session_duration_sec: Some(ttl_sec),
                sender: sender.clone(),
                target_origin: meta_in.target_origin.clone(),
                target_path: Some(meta_in.target_path.clone()),
                comment: meta_in.comment.clone(),
            },
            created_at: created_at.clone(),
            expires_at: expires_at.clone(),
        };

        let ttl = Duration::from_secs(ttl_sec);
        self.storage
            .put(NS_INBOX, &inbox_key(recipient, &id), &item, Some(ttl))
            .await?;

        if let Some(sender) = sender {
            let session = SessionRecord {
                id: session_id.clone(),
                sender: sender.clone(),
                recipient: recipient.to_string(),
                target_origin: meta_in.target_origin,
                target_path: Some(meta_in.target_path),
                created_at,
                duration_sec: ttl_sec,
                expires_at,
                accepted_at: None,
                revoked_at: None,
                restored_at: None,
                cipher: payload.cipher,
                alg: Some(alg),
                cmp: payload.cmp,
            };
            self.storage
                .put(NS_SESSIONS, &session_id, &session, Some(ttl))
                .await?;
            self.storage
                .put(
                    NS_SESSIONS_BY_SENDER,
                    &sender_index_key(&sender, &session_id),
                    &"1",
                    Some(ttl),
                )
                .await?;
        }

        tracing::info!(recipient = %recipient, ttl_sec = ttl_sec, "Inbox delivery enqueued");

        Ok(Delivered { id, session_id })
    }

    pub async fn poll(&self, recipient: &str, limit: Option<usize>) -> Result<Vec<PolledItem>> {
        validate_username(recipient)?;
        let limit = limit.unwrap_or(POLL_LIMIT_DEFAULT).clamp(1, POLL_LIMIT_MAX);

        let prefix = inbox_prefix(recipient);
        let keys = self.storage.list_keys(NS_INBOX, &prefix, limit).await?;

        let mut items = Vec::with_capacity(keys.len());
        for key in keys {
            // Entries can expire between list and get; skip the gaps.
            let Some(item) = self.storage.get::<InboxItem>(NS_INBOX, &key).await? else {
                continue;
            };
            items.push(PolledItem {
                id: key[prefix.len()..].to_string(),
                cipher: item.cipher,
                alg: item.alg,
                cmp: item.cmp,
                meta: item.meta,
                expires_at: item.expires_at,
            });
        }

        Ok(items)
    }

    /// Acknowledge items by id. Unknown ids still count; acking twice is
    /// harmless.
    pub async fn ack(&self, recipient: &str, ids: &[String]) -> Result<usize> {
        validate_username(recipient)?;

        let mut deleted = 0;
        for id in ids {
            self.storage
                .delete(NS_INBOX, &inbox_key(recipient, id))
                .await?;
            deleted += 1;
        }

        Ok(deleted)
    }

    /// Push a lifecycle item (revoke control message or restored share)
    /// derived from a session record.
    pub(crate) async fn push_for_session(
        &self,
        session: &SessionRecord,
        kind: DeliveryKind,
        ttl_sec: u64,
    ) -> Result<String> {
        let id = new_delivery_id();
        let is_share = kind == DeliveryKind::Share;

        let item = InboxItem {
            cipher: if is_share {
                session.cipher.clone()
            } else {
                String::new()
            },
            alg: if is_share { session.alg.clone() } else { None },
            cmp: if is_share { session.cmp.clone() } else { None },
            meta: InboxMeta {
                kind,
                session_id: Some(session.id.clone()),
                session_duration_sec: is_share.then_some(ttl_sec),
                sender: Some(session.sender.clone()),
                target_origin: session.target_origin.clone(),
                target_path: if is_share {
                    session.target_path.clone()
                } else {
                    None
                },
                comment: None,
            },
            created_at: to_rfc3339(now()),
            expires_at: expiry_after(ttl_sec),
        };

        self.storage
            .put(
                NS_INBOX,
                &inbox_key(&session.recipient, &id),
                &item,
                Some(Duration::from_secs(ttl_sec)),
            )
            .await?;

        Ok(id)
    }
}
