use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use handoff_core::SessionRecord;
use serde::Deserialize;
use std::sync::Arc;

use crate::{api::OkResponse, error::ApiError, extractors::ApiJson, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub auth_secret: String,
    pub limit: Option<usize>,
}

/// Credentials carried by every sender-admin mutation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAction {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub auth_secret: String,
}

#[derive(Debug, serde::Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionRecord>,
}

/// GET /v1/sessions
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let admin = state
        .directory
        .authenticate_admin(&params.sender, &params.auth_secret)
        .await?;

    let sessions = state.sessions.list(&admin.username, params.limit).await?;
    Ok(Json(SessionsResponse { sessions }))
}

/// POST /v1/sessions/:id/revoke
pub async fn revoke_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AdminAction>,
) -> Result<Json<OkResponse>, ApiError> {
    let admin = state
        .directory
        .authenticate_admin(&req.username, &req.auth_secret)
        .await?;

    state.sessions.revoke(&admin.username, &id).await?;
    Ok(Json(OkResponse::new()))
}

/// POST /v1/sessions/:id/restore
pub async fn restore_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AdminAction>,
) -> Result<Json<OkResponse>, ApiError> {
    let admin = state
        .directory
        .authenticate_admin(&req.username, &req.auth_secret)
        .await?;

    state.sessions.restore(&admin.username, &id).await?;
    Ok(Json(OkResponse::new()))
}

/// POST /v1/sessions/:id/accepted — unauthenticated: invoked by the
/// recipient after decryption and only advances a timestamp.
pub async fn accept_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    state.sessions.accepted(&id).await?;
    Ok(Json(OkResponse::new()))
}

/// POST /v1/sessions/:id/delete
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AdminAction>,
) -> Result<Json<OkResponse>, ApiError> {
    let admin = state
        .directory
        .authenticate_admin(&req.username, &req.auth_secret)
        .await?;

    state.sessions.delete(&admin.username, &id).await?;
    Ok(Json(OkResponse::new()))
}
