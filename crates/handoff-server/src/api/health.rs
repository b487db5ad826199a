use serde::Serialize;

use axum::response::Json;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Health check endpoint (liveness probe)
///
/// Returns 200 OK if the server process is running; no dependencies are
/// checked.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "handoff",
        version: env!("CARGO_PKG_VERSION"),
    })
}
