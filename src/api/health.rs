use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Health check handler.
/// Returns JSON with status and upstream summary; the credential itself is never echoed.
pub fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let upstream = &state.config.upstream;
    Json(json!({
        "status": "interview-relay is running",
        "upstream": {
            "base_url": upstream.base_url,
            "model": upstream.model,
            "credential_configured": state.upstream.credential_configured(),
        }
    }))
}
