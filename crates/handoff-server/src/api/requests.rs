use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use handoff_core::AccessRequest;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::ApiError, extractors::ApiJson, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub auth_secret: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target_admin: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollParams {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub auth_secret: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RequestsResponse {
    pub items: Vec<AccessRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub auth_secret: String,
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub ok: bool,
    pub deleted: usize,
}

/// POST /v1/requests
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let requester = state
        .directory
        .authenticate(&req.username, &req.auth_secret)
        .await?;

    let id = state
        .requests
        .create(&requester.username, &req.origin, req.url, &req.target_admin)
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /v1/requests/poll
pub async fn poll_requests(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PollParams>,
) -> Result<Json<RequestsResponse>, ApiError> {
    let admin = state
        .directory
        .authenticate_admin(&params.username, &params.auth_secret)
        .await?;

    let items = state.requests.poll(&admin.username, params.limit).await?;
    Ok(Json(RequestsResponse { items }))
}

/// POST /v1/requests/ack
pub async fn ack_requests(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AckRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    state
        .directory
        .authenticate_admin(&req.username, &req.auth_secret)
        .await?;

    let deleted = state.requests.ack(&req.ids).await?;
    Ok(Json(AckResponse { ok: true, deleted }))
}
