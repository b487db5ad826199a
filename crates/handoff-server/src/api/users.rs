use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::ApiError, extractors::ApiJson, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Arbitrary JSON; the server stores it without inspection.
    #[serde(default)]
    pub public_key: serde_json::Value,
    #[serde(default)]
    pub auth_secret: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub ok: bool,
    pub username: String,
    /// Present only on first claim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_secret: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub username: String,
    pub public_key: serde_json::Value,
}

/// GET /v1/users/:username
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.directory.get_user(&username).await?;

    Ok(Json(UserResponse {
        username: user.username,
        public_key: user.public_key,
    }))
}

/// POST /v1/users/:username
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let registration = state
        .directory
        .register(&username, req.public_key, req.auth_secret.as_deref())
        .await?;

    Ok(Json(RegisterResponse {
        ok: true,
        username: registration.username,
        auth_secret: registration.auth_secret,
    }))
}
