//! HTTP handlers, one module per channel.

pub mod health;
pub mod inbox;
pub mod landing;
pub mod requests;
pub mod sessions;
pub mod shares;
pub mod users;

use crate::error::ApiError;
use serde::Serialize;

/// Bare `{ "ok": true }` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn new() -> Self {
        Self { ok: true }
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// Per-route fallback for known paths hit with the wrong verb.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
