//! Access requests: recipient-initiated pull requests for credentials.
//!
//! Requests live for a fixed 15 minutes; a request targeted at a specific
//! admin is invisible to every other admin, while untargeted requests are
//! visible to all of them.

use crate::errors::{Result, ServiceError};
use crate::identity::{validate_username, AdminAllowlist};
use crate::tokens::new_request_id;
use crate::types::{now, to_rfc3339, AccessRequest};
use handoff_storage::keyspace::NS_REQUESTS;
use handoff_storage::{KvStore, KvStoreExt};
use std::sync::Arc;
use std::time::Duration;

pub const REQUEST_TTL: Duration = Duration::from_secs(15 * 60);

pub const POLL_LIMIT_MAX: usize = 100;
pub const POLL_LIMIT_DEFAULT: usize = 50;

pub struct RequestService<S: KvStore + ?Sized> {
    storage: Arc<S>,
    admins: AdminAllowlist,
}

impl<S: KvStore + ?Sized> RequestService<S> {
    pub fn new(storage: Arc<S>, admins: AdminAllowlist) -> Self {
        Self { storage, admins }
    }

    /// File a request on behalf of an already-authenticated requester.
    pub async fn create(
        &self,
        requester: &str,
        origin: &str,
        url: Option<String>,
        target_admin: &str,
    ) -> Result<String> {
        if origin.is_empty() {
            return Err(ServiceError::MissingField("origin"));
        }
        if target_admin.is_empty() {
            return Err(ServiceError::MissingField("targetAdmin"));
        }
        validate_username(target_admin)?;

        if !self.admins.is_wildcard() && !self.admins.allows(target_admin) {
            return Err(ServiceError::AdminNotAllowed);
        }

        let id = new_request_id();
        let record = AccessRequest {
            id: id.clone(),
            requester: requester.to_string(),
            origin: origin.to_string(),
            url,
            created_at: to_rfc3339(now()),
            target_admin: Some(target_admin.to_string()),
        };
        self.storage
            .put(NS_REQUESTS, &id, &record, Some(REQUEST_TTL))
            .await?;

        tracing::info!(requester = %requester, target_admin = %target_admin, "Access request filed");

        Ok(id)
    }

    /// List pending requests visible to an admin.
    pub async fn poll(&self, admin: &str, limit: Option<usize>) -> Result<Vec<AccessRequest>> {
        let limit = limit.unwrap_or(POLL_LIMIT_DEFAULT).clamp(1, POLL_LIMIT_MAX);
        let keys = self.storage.list_keys(NS_REQUESTS, "", limit).await?;

        let mut items = Vec::new();
        for key in keys {
            let Some(request) = self.storage.get::<AccessRequest>(NS_REQUESTS, &key).await? else {
                continue;
            };
            // Targeted requests are only visible to their admin.
            match request.target_admin.as_deref() {
                Some(target) if !target.is_empty() && target != admin => continue,
                _ => items.push(request),
            }
        }

        Ok(items)
    }

    /// Acknowledge requests by id; idempotent.
    pub async fn ack(&self, ids: &[String]) -> Result<usize> {
        let mut deleted = 0;
        for id in ids {
            self.storage.delete(NS_REQUESTS, id).await?;
            deleted += 1;
        }
        Ok(deleted)
    }
}
