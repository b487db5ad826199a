use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use handoff_core::{PolledItem, ShareMeta, SharePayload};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::ApiError, extractors::ApiJson, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueRequest {
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub cipher: String,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default)]
    pub cmp: Option<String>,
    #[serde(default)]
    pub meta: Option<ShareMeta>,
    #[serde(default)]
    pub ttl_sec: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueResponse {
    pub id: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PollParams {
    #[serde(default)]
    pub recipient: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub items: Vec<PolledItem>,
}

#[derive(Debug, Deserialize)]
pub struct AckRequest {
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub ok: bool,
    pub deleted: usize,
}

/// POST /v1/inbox
pub async fn enqueue(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<EnqueueRequest>,
) -> Result<(StatusCode, Json<EnqueueResponse>), ApiError> {
    let delivered = state
        .inbox
        .enqueue(
            &req.recipient,
            SharePayload {
                cipher: req.cipher,
                alg: req.alg,
                cmp: req.cmp,
                meta: req.meta,
                ttl_sec: req.ttl_sec,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(EnqueueResponse {
            id: delivered.id,
            session_id: delivered.session_id,
        }),
    ))
}

/// GET /v1/inbox/poll — unauthenticated by design; confidentiality rides on
/// the cipher.
pub async fn poll(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PollParams>,
) -> Result<Json<PollResponse>, ApiError> {
    let items = state.inbox.poll(&params.recipient, params.limit).await?;
    Ok(Json(PollResponse { items }))
}

/// POST /v1/inbox/ack
pub async fn ack(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AckRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let deleted = state.inbox.ack(&req.recipient, &req.ids).await?;
    Ok(Json(AckResponse { ok: true, deleted }))
}
