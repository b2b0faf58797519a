//! Health check endpoint

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};
use shared::response::ApiResponse;

use crate::core::ServerState;
use crate::utils::time::now_millis;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

async fn health(State(state): State<ServerState>) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "status": "ok",
        "environment": state.config.environment,
        "pending_expiry_jobs": state.scheduler.pending_jobs(),
        "time": now_millis(),
    })))
}
