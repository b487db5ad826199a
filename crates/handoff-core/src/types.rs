//! Stored records and shared wire types.
//!
//! Field names follow the wire contract (camelCase JSON); records are stored
//! in the same shape they travel in.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Default algorithm tag echoed through when the client sends none. The
/// server never interprets it.
pub const DEFAULT_ALG: &str = "ecdh-hkdf-aesgcm";

/// Lower TTL bound in seconds; every stored entry lives at least this long.
pub const MIN_TTL_SEC: u64 = 60;

/// Directory entry for a claimed username.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    /// Client-supplied public key; opaque to the server.
    pub public_key: serde_json::Value,
    /// Hex SHA-256 of the bearer secret issued at first registration.
    pub auth_hash: String,
    pub updated_at: String,
}

/// Client-supplied share metadata, echoed through opaquely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_origin: Option<String>,
    #[serde(default = "default_target_path")]
    pub target_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

fn default_target_path() -> String {
    "/".to_string()
}

impl Default for ShareMeta {
    fn default() -> Self {
        Self {
            target_origin: None,
            target_path: default_target_path(),
            comment: None,
            sender: None,
        }
    }
}

/// Stored share payload. The record exists iff the token is unconsumed and
/// unexpired; it never carries a creation timestamp or plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRecord {
    pub cipher: String,
    pub alg: String,
    pub cmp: Option<String>,
    pub meta: ShareMeta,
}

/// Coordinator-side state for a share token. `consumed` is monotonic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenState {
    pub consumed: bool,
    pub expires_at: String,
    pub recipient: String,
}

/// What an inbox item instructs the recipient to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryKind {
    Share,
    Revoke,
}

/// Normalized metadata attached to an inbox item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxMeta {
    #[serde(rename = "type")]
    pub kind: DeliveryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_duration_sec: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A push-delivered message awaiting acknowledgement. The cipher is empty
/// for control messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxItem {
    pub cipher: String,
    pub alg: Option<String>,
    pub cmp: Option<String>,
    pub meta: InboxMeta,
    pub created_at: String,
    pub expires_at: String,
}

/// Sender-visible twin of a delivered share, used for lifecycle management.
/// Duplicates the ciphertext so restore works after the inbox item is acked;
/// the TTL bounds that retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub sender: String,
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
    pub created_at: String,
    pub duration_sec: u64,
    pub expires_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_at: Option<String>,
    pub cipher: String,
    pub alg: Option<String>,
    pub cmp: Option<String>,
}

/// Recipient-initiated pull request for credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    pub id: String,
    pub requester: String,
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_admin: Option<String>,
}

/// Request-shaping bounds applied before any KV access.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_payload_bytes: u64,
    pub max_ttl_sec: u64,
    pub default_ttl_sec: u64,
}

impl Limits {
    /// Clamp a requested TTL into `[MIN_TTL_SEC, max_ttl_sec]`, falling back
    /// to the default when absent.
    pub fn clamp_ttl(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_ttl_sec)
            .max(MIN_TTL_SEC)
            .min(self.max_ttl_sec)
    }

    /// Reject ciphers whose decoded size would exceed the payload bound.
    /// Length × 0.75 approximates the decoded size of base64 input; the
    /// check stays on the encoded length because the server never decodes.
    pub fn check_payload(&self, cipher: &str) -> crate::errors::Result<()> {
        if cipher.len() as u64 * 3 > self.max_payload_bytes * 4 {
            return Err(crate::errors::ServiceError::PayloadTooLarge);
        }
        Ok(())
    }
}

/// Current UTC time.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// RFC 3339 UTC with millisecond precision, the wire timestamp format.
pub fn to_rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Timestamp `ttl_sec` seconds from now, in wire format.
pub fn expiry_after(ttl_sec: u64) -> String {
    to_rfc3339(now() + Duration::seconds(ttl_sec as i64))
}

/// Whole seconds from now until an RFC 3339 expiry; negative once past, zero
/// for unparseable input.
pub fn secs_until(expires_at: &str) -> i64 {
    match DateTime::parse_from_rfc3339(expires_at) {
        Ok(t) => (t.with_timezone(&Utc) - now()).num_seconds(),
        Err(_) => 0,
    }
}
