//! Health check handler.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use depot_metadata::MetadataStore;
use serde_json::{Value, json};

/// `GET /api/health`
///
/// Verifies metadata connectivity and both tier roots. Intentionally
/// unauthenticated for probes.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.depot.metadata().health_check().await?;
    state.depot.tiers().health_check().await?;
    Ok(Json(json!({ "status": "ok" })))
}
