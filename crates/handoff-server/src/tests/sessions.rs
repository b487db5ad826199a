//! Inbox delivery and session lifecycle tests over the HTTP surface.

use super::helpers::*;
use axum::http::StatusCode;
use handoff_core::{now, to_rfc3339, SessionRecord};
use handoff_storage::keyspace::NS_SESSIONS;
use handoff_storage::KvStoreExt;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_inbox_poll_and_ack() {
    let (app, _state) = test_app("*");
    register_user(&app, "bob").await;
    let (id, _session_id) = deliver(&app, "alice", "bob").await;

    let (status, body) = send_get(&app, "/v1/inbox/poll?recipient=bob").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], id);
    assert_eq!(items[0]["meta"]["type"], "share");
    assert_eq!(items[0]["meta"]["targetPath"], "/");

    let (status, body) = send_json(
        &app,
        "POST",
        "/v1/inbox/ack",
        json!({ "recipient": "bob", "ids": [id] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);

    let (_, body) = send_get(&app, "/v1/inbox/poll?recipient=bob").await;
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_revoke_fans_out_to_recipient_inbox() {
    let (app, _state) = test_app("alice");
    let secret = register_user(&app, "alice").await;
    register_user(&app, "bob").await;
    let (_, session_id) = deliver(&app, "alice", "bob").await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/v1/sessions/{}/revoke", session_id),
        json!({ "username": "alice", "authSecret": secret }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (_, body) = send_get(&app, "/v1/inbox/poll?recipient=bob").await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2, "original share plus revoke control item");

    let revoke = items
        .iter()
        .find(|i| i["meta"]["type"] == "revoke")
        .expect("revoke item");
    assert_eq!(revoke["cipher"], "");
    assert_eq!(revoke["meta"]["sessionId"], session_id.as_str());
    assert_eq!(revoke["meta"]["sender"], "alice");
}

#[tokio::test]
async fn test_session_admin_and_ownership_guards() {
    let (app, _state) = test_app("alice");
    let alice = register_user(&app, "alice").await;
    let bob = register_user(&app, "bob").await;
    let (_, session_id) = deliver(&app, "alice", "bob").await;

    // Not an admin.
    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/v1/sessions/{}/revoke", session_id),
        json!({ "username": "bob", "authSecret": bob }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Bad secret.
    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/v1/sessions/{}/revoke", session_id),
        json!({ "username": "alice", "authSecret": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unknown session.
    let (status, _) = send_json(
        &app,
        "POST",
        "/v1/sessions/feedbeef/revoke",
        json!({ "username": "alice", "authSecret": alice }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_sessions_requires_admin_auth() {
    let (app, _state) = test_app("alice");
    let secret = register_user(&app, "alice").await;
    register_user(&app, "bob").await;
    deliver(&app, "alice", "bob").await;

    let (status, body) = send_get(
        &app,
        &format!("/v1/sessions?sender=alice&authSecret={}", secret),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"].as_array().unwrap().len(), 1);

    let (status, _) = send_get(&app, "/v1/sessions?sender=alice&authSecret=wrong").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_restore_after_expiry_is_rejected() {
    let (app, state) = test_app("alice");
    let secret = register_user(&app, "alice").await;
    register_user(&app, "bob").await;
    let (_, session_id) = deliver(&app, "alice", "bob").await;

    // Age the record down to 30 seconds of remaining life.
    let mut session: SessionRecord = state
        .storage
        .get(NS_SESSIONS, &session_id)
        .await
        .unwrap()
        .unwrap();
    session.expires_at = to_rfc3339(now() + chrono::Duration::seconds(30));
    state
        .storage
        .put(
            NS_SESSIONS,
            &session_id,
            &session,
            Some(Duration::from_secs(600)),
        )
        .await
        .unwrap();

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/v1/sessions/{}/restore", session_id),
        json!({ "username": "alice", "authSecret": secret }),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["error"], "Session expired");
}

#[tokio::test]
async fn test_restore_reenqueues_share() {
    let (app, _state) = test_app("alice");
    let secret = register_user(&app, "alice").await;
    register_user(&app, "bob").await;
    let (id, session_id) = deliver(&app, "alice", "bob").await;

    send_json(
        &app,
        "POST",
        "/v1/inbox/ack",
        json!({ "recipient": "bob", "ids": [id] }),
    )
    .await;

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/v1/sessions/{}/restore", session_id),
        json!({ "username": "alice", "authSecret": secret }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_get(&app, "/v1/inbox/poll?recipient=bob").await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["cipher"], "Y2lwaA");
    assert_eq!(items[0]["meta"]["type"], "share");
}

#[tokio::test]
async fn test_accepted_is_idempotent_and_unauthenticated() {
    let (app, state) = test_app("alice");
    register_user(&app, "alice").await;
    register_user(&app, "bob").await;
    let (_, session_id) = deliver(&app, "alice", "bob").await;

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/v1/sessions/{}/accepted", session_id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let first: SessionRecord = state
        .storage
        .get(NS_SESSIONS, &session_id)
        .await
        .unwrap()
        .unwrap();
    let stamp = first.accepted_at.expect("acceptedAt set");

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/v1/sessions/{}/accepted", session_id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let second: SessionRecord = state
        .storage
        .get(NS_SESSIONS, &session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.accepted_at.as_deref(), Some(stamp.as_str()));

    let (status, _) = send_json(&app, "POST", "/v1/sessions/feedbeef/accepted", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_session() {
    let (app, _state) = test_app("alice");
    let secret = register_user(&app, "alice").await;
    register_user(&app, "bob").await;
    let (_, session_id) = deliver(&app, "alice", "bob").await;

    let (status, _) = send_json(
        &app,
        "POST",
        &format!("/v1/sessions/{}/delete", session_id),
        json!({ "username": "alice", "authSecret": secret }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_get(
        &app,
        &format!("/v1/sessions?sender=alice&authSecret={}", secret),
    )
    .await;
    assert!(body["sessions"].as_array().unwrap().is_empty());
}
