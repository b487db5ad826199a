use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod extractors;
mod middleware;
mod state;

#[cfg(test)]
mod tests;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handoff_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let bind_address = config.bind_address;
    tracing::info!("Starting handoff server on {}", bind_address);

    // Initialize application state
    let state = Arc::new(AppState::new(config)?);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route(
            "/health",
            get(api::health::health_check).fallback(api::method_not_allowed),
        )
        // Share-link landing page
        .route(
            "/session/:token",
            get(api::landing::session_landing).fallback(api::method_not_allowed),
        )
        // Identity directory
        .route(
            "/v1/users/:username",
            get(api::users::get_user)
                .post(api::users::register_user)
                .fallback(api::method_not_allowed),
        )
        // Single-use shares
        .route(
            "/v1/shares",
            post(api::shares::create_share).fallback(api::method_not_allowed),
        )
        .route(
            "/v1/shares/:token",
            get(api::shares::get_share).fallback(api::method_not_allowed),
        )
        .route(
            "/v1/shares/:token/consume",
            post(api::shares::consume_share).fallback(api::method_not_allowed),
        )
        // Recipient inbox
        .route(
            "/v1/inbox",
            post(api::inbox::enqueue).fallback(api::method_not_allowed),
        )
        .route(
            "/v1/inbox/poll",
            get(api::inbox::poll).fallback(api::method_not_allowed),
        )
        .route(
            "/v1/inbox/ack",
            post(api::inbox::ack).fallback(api::method_not_allowed),
        )
        // Session registry
        .route(
            "/v1/sessions",
            get(api::sessions::list_sessions).fallback(api::method_not_allowed),
        )
        .route(
            "/v1/sessions/:id/revoke",
            post(api::sessions::revoke_session).fallback(api::method_not_allowed),
        )
        .route(
            "/v1/sessions/:id/restore",
            post(api::sessions::restore_session).fallback(api::method_not_allowed),
        )
        .route(
            "/v1/sessions/:id/accepted",
            post(api::sessions::accept_session).fallback(api::method_not_allowed),
        )
        .route(
            "/v1/sessions/:id/delete",
            post(api::sessions::delete_session).fallback(api::method_not_allowed),
        )
        // Access requests
        .route(
            "/v1/requests",
            post(api::requests::create_request).fallback(api::method_not_allowed),
        )
        .route(
            "/v1/requests/poll",
            get(api::requests::poll_requests).fallback(api::method_not_allowed),
        )
        .route(
            "/v1/requests/ack",
            post(api::requests::ack_requests).fallback(api::method_not_allowed),
        )
        .fallback(api::not_found)
        // Add middleware (order matters: last added = first executed; CORS
        // must be outermost to catch preflights and error responses)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::cors_middleware,
        ))
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Graceful shutdown initiated");
}
