//! Access request channel tests.

use super::helpers::*;
use crate::*;

#[tokio::test]
async fn test_targeted_request_visible_only_to_its_admin() {
    let stack = stack_with("alice,dave", test_limits());
    register(&stack, "alice").await;
    register(&stack, "dave").await;
    register(&stack, "carol").await;

    let id = stack
        .requests
        .create("carol", "https://app.example", None, "alice")
        .await
        .unwrap();
    assert_eq!(id.len(), 32);

    let seen_by_alice = stack.requests.poll("alice", None).await.unwrap();
    assert_eq!(seen_by_alice.len(), 1);
    assert_eq!(seen_by_alice[0].requester, "carol");
    assert_eq!(seen_by_alice[0].target_admin.as_deref(), Some("alice"));

    // Dave is also an admin but the request is not his.
    assert!(stack.requests.poll("dave", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_enforces_allowlist() {
    let stack = stack_with("alice", test_limits());
    register(&stack, "carol").await;

    let result = stack
        .requests
        .create("carol", "https://app.example", None, "mallory")
        .await;
    assert!(matches!(result, Err(ServiceError::AdminNotAllowed)));
}

#[tokio::test]
async fn test_wildcard_allowlist_accepts_any_target() {
    let stack = stack();
    register(&stack, "carol").await;

    let result = stack
        .requests
        .create("carol", "https://app.example", None, "anyone")
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_create_validations() {
    let stack = stack();

    assert!(matches!(
        stack.requests.create("carol", "", None, "alice").await,
        Err(ServiceError::MissingField("origin"))
    ));
    assert!(matches!(
        stack.requests.create("carol", "https://a", None, "").await,
        Err(ServiceError::MissingField("targetAdmin"))
    ));
    assert!(matches!(
        stack.requests.create("carol", "https://a", None, "_bad").await,
        Err(ServiceError::InvalidUsername)
    ));
}

#[tokio::test]
async fn test_ack_is_idempotent() {
    let stack = stack();
    register(&stack, "carol").await;

    let id = stack
        .requests
        .create("carol", "https://app.example", None, "alice")
        .await
        .unwrap();

    assert_eq!(stack.requests.ack(&[id.clone()]).await.unwrap(), 1);
    assert!(stack.requests.poll("alice", None).await.unwrap().is_empty());
    assert_eq!(stack.requests.ack(&[id]).await.unwrap(), 1);
}

#[tokio::test]
async fn test_request_carries_url_and_timestamps() {
    let stack = stack();
    register(&stack, "carol").await;

    stack
        .requests
        .create(
            "carol",
            "https://app.example",
            Some("https://app.example/login".to_string()),
            "alice",
        )
        .await
        .unwrap();

    let items = stack.requests.poll("alice", None).await.unwrap();
    assert_eq!(items[0].url.as_deref(), Some("https://app.example/login"));
    assert!(!items[0].created_at.is_empty());
}
