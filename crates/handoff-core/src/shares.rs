//! Single-use share channel: at-most-once delivery of an opaque cipher via
//! a shareable token.

use crate::coordinator::{TokenCoordinator, TokenStatus};
use crate::errors::{Result, ServiceError};
use crate::identity::{validate_username, DirectoryService};
use crate::tokens::new_share_token;
use crate::types::{expiry_after, Limits, ShareMeta, ShareRecord, DEFAULT_ALG};
use handoff_storage::keyspace::NS_SHARES;
use handoff_storage::{KvStore, KvStoreExt};
use std::sync::Arc;
use std::time::Duration;

/// Client inputs for a share or inbox delivery.
#[derive(Debug, Default)]
pub struct SharePayload {
    pub cipher: String,
    pub alg: Option<String>,
    pub cmp: Option<String>,
    pub meta: Option<ShareMeta>,
    pub ttl_sec: Option<u64>,
}

/// A freshly created share link.
#[derive(Debug)]
pub struct CreatedShare {
    pub token: String,
    pub expires_at: String,
}

pub struct ShareService<S: KvStore + ?Sized> {
    storage: Arc<S>,
    directory: Arc<DirectoryService<S>>,
    coordinator: Arc<TokenCoordinator<S>>,
    limits: Limits,
}

impl<S: KvStore + ?Sized> ShareService<S> {
    pub fn new(
        storage: Arc<S>,
        directory: Arc<DirectoryService<S>>,
        coordinator: Arc<TokenCoordinator<S>>,
        limits: Limits,
    ) -> Self {
        Self {
            storage,
            directory,
            coordinator,
            limits,
        }
    }

    pub async fn create(&self, recipient: &str, payload: SharePayload) -> Result<CreatedShare> {
        validate_username(recipient)?;
        if payload.cipher.is_empty() {
            return Err(ServiceError::MissingField("cipher"));
        }
        self.limits.check_payload(&payload.cipher)?;
        let ttl_sec = self.limits.clamp_ttl(payload.ttl_sec);

        if !self.directory.user_exists(recipient).await? {
            return Err(ServiceError::RecipientNotFound(recipient.to_string()));
        }

        let token = new_share_token();
        let expires_at = expiry_after(ttl_sec);
        let record = ShareRecord {
            cipher: payload.cipher,
            alg: payload.alg.unwrap_or_else(|| DEFAULT_ALG.to_string()),
            cmp: payload.cmp,
            meta: payload.meta.unwrap_or_default(),
        };

        let ttl = Duration::from_secs(ttl_sec);
        self.storage.put(NS_SHARES, &token, &record, Some(ttl)).await?;
        self.coordinator
            .init(&token, recipient, &expires_at, ttl)
            .await?;

        tracing::info!(recipient = %recipient, ttl_sec = ttl_sec, "Share created");

        Ok(CreatedShare { token, expires_at })
    }

    pub async fn fetch(&self, token: &str) -> Result<ShareRecord> {
        match self.coordinator.status(token).await? {
            TokenStatus::Unknown => Err(ServiceError::ShareNotFound),
            TokenStatus::Consumed => Err(ServiceError::ShareConsumed),
            // The record can lapse between the status check and the read.
            TokenStatus::Live => self
                .storage
                .get(NS_SHARES, token)
                .await?
                .ok_or(ServiceError::ShareNotFound),
        }
    }

    /// Consume a token and drop its payload. At most one caller ever
    /// succeeds for a given token.
    pub async fn consume(&self, token: &str) -> Result<()> {
        self.coordinator.consume(token).await?;
        self.storage.delete(NS_SHARES, token).await?;
        Ok(())
    }
}
