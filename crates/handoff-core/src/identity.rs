//! Identity directory: first-claim usernames, authenticated key rotation,
//! and the admin predicate.
//!
//! Bearer secrets are issued once at registration and stored only as their
//! SHA-256; every later privileged write presents the plaintext secret for
//! comparison.

use crate::errors::{Result, ServiceError};
use crate::tokens::{new_bearer_secret, sha256_hex};
use crate::types::{now, to_rfc3339, UserRecord};
use handoff_storage::keyspace::NS_USERS;
use handoff_storage::{KvStore, KvStoreExt};
use std::sync::Arc;

pub const USERNAME_MAX_LEN: usize = 64;

/// Validate a username: leading ASCII alphanumeric, then `[A-Za-z0-9_.-]`,
/// at most 64 characters.
pub fn validate_username(username: &str) -> Result<()> {
    if username.len() > USERNAME_MAX_LEN {
        return Err(ServiceError::InvalidUsername);
    }

    let mut chars = username.chars();
    let first = chars.next().ok_or(ServiceError::InvalidUsername)?;
    if !first.is_ascii_alphanumeric() {
        return Err(ServiceError::InvalidUsername);
    }

    for c in chars {
        if !c.is_ascii_alphanumeric() && !matches!(c, '_' | '.' | '-') {
            return Err(ServiceError::InvalidUsername);
        }
    }

    Ok(())
}

/// Admin allowlist parsed from configuration. An empty list or one
/// containing `*` treats every authenticated user as an admin.
#[derive(Debug, Clone)]
pub struct AdminAllowlist {
    names: Vec<String>,
    wildcard: bool,
}

impl AdminAllowlist {
    pub fn from_csv(csv: &str) -> Self {
        let names: Vec<String> = csv
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let wildcard = names.is_empty() || names.iter().any(|n| n == "*");
        Self { names, wildcard }
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Whether an authenticated user passes the admin predicate.
    pub fn allows(&self, username: &str) -> bool {
        self.wildcard || self.names.iter().any(|n| n == username)
    }
}

/// Outcome of a register call; the bearer secret is only present on the
/// first claim.
#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub auth_secret: Option<String>,
}

/// Identity directory over the users keyspace.
pub struct DirectoryService<S: KvStore + ?Sized> {
    storage: Arc<S>,
    admins: AdminAllowlist,
}

impl<S: KvStore + ?Sized> DirectoryService<S> {
    pub fn new(storage: Arc<S>, admins: AdminAllowlist) -> Self {
        Self { storage, admins }
    }

    pub fn admins(&self) -> &AdminAllowlist {
        &self.admins
    }

    pub async fn get_user(&self, username: &str) -> Result<UserRecord> {
        validate_username(username)?;
        self.storage
            .get(NS_USERS, username)
            .await?
            .ok_or_else(|| ServiceError::UserNotFound(username.to_string()))
    }

    /// Whether a username is claimed; used for recipient checks.
    pub async fn user_exists(&self, username: &str) -> Result<bool> {
        Ok(self.storage.exists(NS_USERS, username).await?)
    }

    /// First claim issues a fresh bearer secret; later writes require the
    /// current secret and rotate the public key.
    pub async fn register(
        &self,
        username: &str,
        public_key: serde_json::Value,
        auth_secret: Option<&str>,
    ) -> Result<Registration> {
        validate_username(username)?;
        if public_key.is_null() {
            return Err(ServiceError::MissingField("publicKey"));
        }

        let existing: Option<UserRecord> = self.storage.get(NS_USERS, username).await?;
        match existing {
            None => {
                let secret = new_bearer_secret();
                let record = UserRecord {
                    username: username.to_string(),
                    public_key,
                    auth_hash: sha256_hex(secret.as_bytes()),
                    updated_at: to_rfc3339(now()),
                };
                self.storage.put(NS_USERS, username, &record, None).await?;

                tracing::info!(username = %username, "Username claimed");

                Ok(Registration {
                    username: username.to_string(),
                    // One-time disclosure; only the hash is kept.
                    auth_secret: Some(secret),
                })
            }
            Some(mut record) => {
                let secret = auth_secret.unwrap_or("");
                if secret.is_empty() || sha256_hex(secret.as_bytes()) != record.auth_hash {
                    return Err(ServiceError::AuthSecretMismatch);
                }

                record.public_key = public_key;
                record.updated_at = to_rfc3339(now());
                self.storage.put(NS_USERS, username, &record, None).await?;

                tracing::info!(username = %username, "Public key rotated");

                Ok(Registration {
                    username: username.to_string(),
                    auth_secret: None,
                })
            }
        }
    }

    /// Authenticate a bearer secret for a username.
    pub async fn authenticate(&self, username: &str, secret: &str) -> Result<UserRecord> {
        validate_username(username)?;
        let user: UserRecord = self
            .storage
            .get(NS_USERS, username)
            .await?
            .ok_or(ServiceError::AuthSecretMismatch)?;

        if secret.is_empty() || sha256_hex(secret.as_bytes()) != user.auth_hash {
            return Err(ServiceError::AuthSecretMismatch);
        }

        Ok(user)
    }

    /// Authenticate and require the admin predicate.
    pub async fn authenticate_admin(&self, username: &str, secret: &str) -> Result<UserRecord> {
        let user = self.authenticate(username, secret).await?;
        if !self.admins.allows(&user.username) {
            return Err(ServiceError::AdminRequired);
        }
        Ok(user)
    }
}
