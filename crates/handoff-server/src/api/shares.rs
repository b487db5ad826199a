use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Json,
};
use handoff_core::{ShareMeta, SharePayload};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::ApiError, extractors::ApiJson, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareRequest {
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
pub struct CreateShareResponse {
    pub token: String,
    pub share_url: String,
    pub expires_at: String,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub token: String,
    pub cipher: String,
    pub alg: String,
    pub cmp: Option<String>,
    pub meta: ShareMeta,
}

/// Share-link base: configured `BASE_URL`, else derived from the request.
fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.config.base_url {
        return base.clone();
    }

    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");

    format!("{}://{}", proto, host)
}

/// POST /v1/shares
pub async fn create_share(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<CreateShareRequest>,
) -> Result<(StatusCode, Json<CreateShareResponse>), ApiError> {
    let created = state
        .shares
        .create(
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

    let share_url = format!("{}/session/{}", base_url(&state, &headers), created.token);

    Ok((
        StatusCode::CREATED,
        Json(CreateShareResponse {
            token: created.token,
            share_url,
            expires_at: created.expires_at,
        }),
    ))
}

/// GET /v1/shares/:token
pub async fn get_share(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<ShareResponse>, ApiError> {
    let record = state.shares.fetch(&token).await?;

    Ok(Json(ShareResponse {
        token,
        cipher: record.cipher,
        alg: record.alg,
        cmp: record.cmp,
        meta: record.meta,
    }))
}

/// POST /v1/shares/:token/consume
pub async fn consume_share(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.shares.consume(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}
