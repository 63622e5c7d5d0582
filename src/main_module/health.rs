//! Health check handler

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::core::shared::state::AppState;

/// Reports `degraded` when the pipeline store cannot be queried. The service
/// keeps answering in that state with placeholder data.
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let store_ok = state.pipeline.list_for_owner("health-check").await.is_ok();
    let status = if store_ok { "healthy" } else { "degraded" };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": status,
            "service": "leadserver",
            "version": env!("CARGO_PKG_VERSION"),
            "store": store_ok
        })),
    )
}
