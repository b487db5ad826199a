//! Router-level test helpers: drive the real router in-process.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use handoff_core::{AdminAllowlist, Limits};
use handoff_storage::MemoryStore;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::Config;
use crate::state::AppState;

pub fn test_config(admins: &str) -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_path: None,
        allowed_origins: vec!["*".to_string()],
        admin_users: AdminAllowlist::from_csv(admins),
        limits: Limits {
            max_payload_bytes: 8_388_608,
            max_ttl_sec: 3600,
            default_ttl_sec: 600,
        },
        base_url: Some("https://handoff.test".to_string()),
    }
}

pub fn test_app(admins: &str) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::with_storage(
        test_config(admins),
        Arc::new(MemoryStore::new()),
    ));
    (crate::create_router(state.clone()), state)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn send_json(app: &Router, method: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    read_json(send(app, request).await).await
}

pub async fn send_get(app: &Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    read_json(send(app, request).await).await
}

pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register a user and return the one-time bearer secret.
pub async fn register_user(app: &Router, name: &str) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        &format!("/v1/users/{}", name),
        json!({ "publicKey": format!("PUBK-{}", name) }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["authSecret"].as_str().unwrap().to_string()
}

/// Deliver an inbox share from `sender` to `recipient`, returning
/// `(id, sessionId)`.
pub async fn deliver(app: &Router, sender: &str, recipient: &str) -> (String, String) {
    let (status, body) = send_json(
        app,
        "POST",
        "/v1/inbox",
        json!({
            "recipient": recipient,
            "cipher": "Y2lwaA",
            "ttlSec": 600,
            "meta": { "sender": sender, "targetOrigin": "https://app.example" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (
        body["id"].as_str().unwrap().to_string(),
        body["sessionId"].as_str().unwrap().to_string(),
    )
}
