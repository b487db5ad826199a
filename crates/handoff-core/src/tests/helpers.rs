//! Test helpers for the service suites.

use crate::*;
use handoff_storage::MemoryStore;
use std::sync::Arc;

pub struct TestStack {
    pub storage: Arc<MemoryStore>,
    pub directory: Arc<DirectoryService<MemoryStore>>,
    pub shares: Arc<ShareService<MemoryStore>>,
    pub inbox: Arc<InboxService<MemoryStore>>,
    pub sessions: Arc<SessionRegistry<MemoryStore>>,
    pub requests: Arc<RequestService<MemoryStore>>,
}

pub fn test_limits() -> Limits {
    Limits {
        max_payload_bytes: 8 * 1024 * 1024,
        max_ttl_sec: 3600,
        default_ttl_sec: 600,
    }
}

/// Build the full service graph over a fresh in-memory store.
pub fn stack_with(admins: &str, limits: Limits) -> TestStack {
    let storage = Arc::new(MemoryStore::new());
    let allowlist = AdminAllowlist::from_csv(admins);

    let directory = Arc::new(DirectoryService::new(storage.clone(), allowlist.clone()));
    let coordinator = Arc::new(TokenCoordinator::new(storage.clone()));
    let shares = Arc::new(ShareService::new(
        storage.clone(),
        directory.clone(),
        coordinator,
        limits,
    ));
    let inbox = Arc::new(InboxService::new(storage.clone(), directory.clone(), limits));
    let sessions = Arc::new(SessionRegistry::new(storage.clone(), inbox.clone()));
    let requests = Arc::new(RequestService::new(storage.clone(), allowlist));

    TestStack {
        storage,
        directory,
        shares,
        inbox,
        sessions,
        requests,
    }
}

pub fn stack() -> TestStack {
    stack_with("*", test_limits())
}

/// Register a user and return the one-time bearer secret.
pub async fn register(stack: &TestStack, name: &str) -> String {
    stack
        .directory
        .register(name, serde_json::json!(format!("PUBK-{}", name)), None)
        .await
        .unwrap()
        .auth_secret
        .unwrap()
}

pub fn payload(cipher: &str, ttl_sec: u64) -> SharePayload {
    SharePayload {
        cipher: cipher.to_string(),
        ttl_sec: Some(ttl_sec),
        ..Default::default()
    }
}

/// Payload whose metadata names a sender, so a session record is created.
pub fn payload_from(sender: &str, cipher: &str, ttl_sec: u64) -> SharePayload {
    SharePayload {
        cipher: cipher.to_string(),
        ttl_sec: Some(ttl_sec),
        meta: Some(ShareMeta {
            target_origin: Some("https://app.example".to_string()),
            sender: Some(sender.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}
