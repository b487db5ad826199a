//! Directory registration, rotation, and authentication tests.

use super::helpers::*;
use crate::*;
use handoff_storage::keyspace::NS_USERS;
use handoff_storage::KvStoreExt;

#[tokio::test]
async fn test_first_claim_issues_secret_once() {
    let stack = stack();

    let registration = stack
        .directory
        .register("alice", serde_json::json!("PUBK-alice"), None)
        .await
        .unwrap();

    let secret = registration.auth_secret.expect("secret on first claim");
    assert!(!secret.contains('='));

    let user = stack.directory.get_user("alice").await.unwrap();
    assert_eq!(user.public_key, serde_json::json!("PUBK-alice"));
    assert_eq!(user.auth_hash, tokens::sha256_hex(secret.as_bytes()));
}

#[tokio::test]
async fn test_rotation_requires_matching_secret() {
    let stack = stack();
    let secret = register(&stack, "alice").await;

    // Wrong secret leaves the record unchanged.
    let result = stack
        .directory
        .register("alice", serde_json::json!("PUBK2"), Some("wrong"))
        .await;
    assert!(matches!(result, Err(ServiceError::AuthSecretMismatch)));

    let user = stack.directory.get_user("alice").await.unwrap();
    assert_eq!(user.public_key, serde_json::json!("PUBK-alice"));

    // Matching secret rotates the key and discloses nothing.
    let registration = stack
        .directory
        .register("alice", serde_json::json!("PUBK2"), Some(&secret))
        .await
        .unwrap();
    assert!(registration.auth_secret.is_none());

    let user = stack.directory.get_user("alice").await.unwrap();
    assert_eq!(user.public_key, serde_json::json!("PUBK2"));
}

#[tokio::test]
async fn test_rotation_with_empty_secret_rejected() {
    let stack = stack();
    register(&stack, "alice").await;

    let result = stack
        .directory
        .register("alice", serde_json::json!("PUBK2"), Some(""))
        .await;
    assert!(matches!(result, Err(ServiceError::AuthSecretMismatch)));

    let result = stack
        .directory
        .register("alice", serde_json::json!("PUBK2"), None)
        .await;
    assert!(matches!(result, Err(ServiceError::AuthSecretMismatch)));
}

#[tokio::test]
async fn test_register_requires_public_key() {
    let stack = stack();
    let result = stack
        .directory
        .register("alice", serde_json::Value::Null, None)
        .await;
    assert!(matches!(result, Err(ServiceError::MissingField("publicKey"))));
}

#[tokio::test]
async fn test_get_unknown_user() {
    let stack = stack();
    let result = stack.directory.get_user("ghost").await;
    assert!(matches!(result, Err(ServiceError::UserNotFound(_))));
}

#[tokio::test]
async fn test_invalid_username_rejected_before_storage() {
    let stack = stack();
    let result = stack.directory.get_user("_bad").await;
    assert!(matches!(result, Err(ServiceError::InvalidUsername)));

    let result = stack
        .directory
        .register("_bad", serde_json::json!("PUBK"), None)
        .await;
    assert!(matches!(result, Err(ServiceError::InvalidUsername)));
}

#[tokio::test]
async fn test_authenticate() {
    let stack = stack();
    let secret = register(&stack, "alice").await;

    let user = stack.directory.authenticate("alice", &secret).await.unwrap();
    assert_eq!(user.username, "alice");

    assert!(matches!(
        stack.directory.authenticate("alice", "wrong").await,
        Err(ServiceError::AuthSecretMismatch)
    ));
    assert!(matches!(
        stack.directory.authenticate("alice", "").await,
        Err(ServiceError::AuthSecretMismatch)
    ));
    assert!(matches!(
        stack.directory.authenticate("ghost", &secret).await,
        Err(ServiceError::AuthSecretMismatch)
    ));
}

#[tokio::test]
async fn test_admin_predicate_with_explicit_list() {
    let stack = stack_with("alice", test_limits());
    let alice_secret = register(&stack, "alice").await;
    let bob_secret = register(&stack, "bob").await;

    assert!(stack
        .directory
        .authenticate_admin("alice", &alice_secret)
        .await
        .is_ok());
    assert!(matches!(
        stack.directory.authenticate_admin("bob", &bob_secret).await,
        Err(ServiceError::AdminRequired)
    ));
}

#[tokio::test]
async fn test_user_records_have_no_ttl() {
    let stack = stack();
    register(&stack, "alice").await;

    // A directory entry is never expired away.
    let record: Option<UserRecord> = stack.storage.get(NS_USERS, "alice").await.unwrap();
    assert!(record.is_some());
}
