//! Keyspace definitions.
//!
//! The service's three logical stores (user directory, share/session store,
//! inbox store) map onto named namespaces; the RocksDB backend opens one
//! column family per namespace. Share tokens are 48 hex characters and inbox
//! keys carry a `<recipient>:` prefix, so the keyspaces cannot collide even
//! when a backend aliases them onto one physical store.

/// User directory: username → UserRecord. No TTL.
pub const NS_USERS: &str = "users";

/// Share payloads: token (48 hex) → ShareRecord. TTL = share TTL.
pub const NS_SHARES: &str = "shares";

/// Token coordination state: token → TokenState. TTL = share TTL.
pub const NS_SHARE_TOKENS: &str = "share_tokens";

/// Inbox items: `<recipient>:<id>` → InboxItem. TTL = item TTL.
pub const NS_INBOX: &str = "inbox";

/// Session records: sessionId (40 hex) → SessionRecord. TTL = session TTL.
pub const NS_SESSIONS: &str = "sessions";

/// Sender index: `<sender>:<sessionId>` → "1". Same TTL as the session.
pub const NS_SESSIONS_BY_SENDER: &str = "sessions_by_sender";

/// Access requests: id (32 hex) → AccessRequest. TTL = 15 min.
pub const NS_REQUESTS: &str = "requests";

/// Get all namespace names
pub fn all_namespaces() -> Vec<&'static str> {
    vec![
        NS_USERS,
        NS_SHARES,
        NS_SHARE_TOKENS,
        NS_INBOX,
        NS_SESSIONS,
        NS_SESSIONS_BY_SENDER,
        NS_REQUESTS,
    ]
}

/// Inbox key for one of a recipient's items.
pub fn inbox_key(recipient: &str, id: &str) -> String {
    format!("{}:{}", recipient, id)
}

/// Prefix covering all of a recipient's inbox items.
pub fn inbox_prefix(recipient: &str) -> String {
    format!("{}:", recipient)
}

/// Sender index key for one session.
pub fn sender_index_key(sender: &str, session_id: &str) -> String {
    format!("{}:{}", sender, session_id)
}

/// Prefix covering all of a sender's sessions.
pub fn sender_index_prefix(sender: &str) -> String {
    format!("{}:", sender)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_namespaces_non_empty() {
        assert!(!all_namespaces().is_empty());
    }

    #[test]
    fn test_no_duplicate_namespaces() {
        let namespaces = all_namespaces();
        let mut unique = std::collections::HashSet::new();

        for ns in &namespaces {
            assert!(unique.insert(ns), "Duplicate namespace: {}", ns);
        }
    }

    #[test]
    fn test_inbox_key_round_trip() {
        let key = inbox_key("bob", "abc123");
        let prefix = inbox_prefix("bob");
        assert!(key.starts_with(&prefix));
        assert_eq!(&key[prefix.len()..], "abc123");
    }
}
