use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, Response, StatusCode},
    middleware::Next,
};
use std::sync::Arc;
use std::time::Instant;

use crate::state::AppState;

/// Request ID middleware
pub async fn request_id_middleware(req: Request<Body>, next: Next) -> Response<Body> {
    let request_id = uuid::Uuid::new_v4().to_string();

    tracing::info!(
        request_id = %request_id,
        method = %req.method(),
        uri = %req.uri(),
        "Request started"
    );

    let start = Instant::now();
    let response = next.run(req).await;
    let elapsed = start.elapsed();

    tracing::info!(
        request_id = %request_id,
        status = %response.status(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Request completed"
    );

    response
}

/// Resolve the CORS origin header to echo for a request, if any.
///
/// A `*` entry in the allowlist echoes whatever origin the request carries
/// (literal `*` when absent); otherwise only exact matches are echoed. A
/// literal `*` response value must never be combined with credentials, so
/// the echo happens instead of a wildcard header.
fn allowed_origin(allowed: &[String], origin: Option<&HeaderValue>) -> Option<HeaderValue> {
    if allowed.iter().any(|o| o == "*") {
        return Some(
            origin
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static("*")),
        );
    }

    let origin = origin?;
    let value = origin.to_str().ok()?;
    if allowed.iter().any(|o| o == value) {
        Some(origin.clone())
    } else {
        None
    }
}

/// Apply the CORS allowlist to every response and short-circuit preflights
/// with 204.
pub async fn cors_middleware(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response<Body> {
    let origin = allowed_origin(
        &state.config.allowed_origins,
        req.headers().get(header::ORIGIN),
    );

    let mut response = if req.method() == Method::OPTIONS {
        let requested_headers = req
            .headers()
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("content-type"));

        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET,POST,OPTIONS"),
        );
        response
            .headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested_headers);
        response
    } else {
        next.run(req).await
    };

    if let Some(origin) = origin {
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }

    response
}
