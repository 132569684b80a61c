//! Bearer-token authentication middleware.
//!
//! Deliberately minimal: when `server.auth_token` is configured every API
//! request must present it, and when it is unset all requests are admitted.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

/// Check the bearer token on API routes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.server.auth_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected => Ok(next.run(request).await),
        Some(_) => Err(ApiError::Unauthorized("invalid bearer token".to_string())),
        None => Err(ApiError::Unauthorized(
            "missing bearer token".to_string(),
        )),
    }
}
