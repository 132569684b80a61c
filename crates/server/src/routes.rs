//! Route configuration.

use crate::auth::auth_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Slack above the configured upload maximum so the engine's own size check
/// decides the 413, not the body extractor.
const BODY_LIMIT_SLACK: usize = 1024;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes as usize + BODY_LIMIT_SLACK;

    let api_routes = Router::new()
        .route("/api/upload", post(handlers::upload))
        .route("/api/download/{name}", get(handlers::download))
        .route("/api/files", get(handlers::list_files))
        .route("/api/files/{name}", delete(handlers::delete_file))
        .route("/api/info/{name}", get(handlers::file_info))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        // Health check (intentionally unauthenticated for probes)
        .route("/api/health", get(handlers::health_check));

    api_routes
        .layer(DefaultBodyLimit::max(body_limit))
        // The browser frontend is served from another origin on the LAN.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
