//! `POST /api/generate-problem/list`: ask the model for a problem list.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use bytes::Bytes;

use crate::api::common::error_response;
use crate::error::RelayError;
use crate::protocol::interview::validate_problem_list;
use crate::protocol::{ProblemListRequest, ProblemListResponse};
use crate::state::AppState;

const ROUTE: &str = "problem_list";

pub async fn handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request_id = state.next_request_id();
    match handler_inner(&state, &body).await {
        Ok(result) => {
            tracing::info!(%request_id, result_bytes = result.len(), "problem list generated");
            Json(ProblemListResponse { result }).into_response()
        }
        Err(err) => error_response(err, &request_id, ROUTE),
    }
}

async fn handler_inner(state: &AppState, body: &[u8]) -> Result<String, RelayError> {
    let request = ProblemListRequest::from_slice(body)?;
    let messages = request.to_messages(state.config.features.problem_count);
    let completion = state.upstream.complete(&messages).await?;
    let result = completion
        .first_message_content()
        .unwrap_or_default()
        .to_string();

    if state.config.features.validate_problem_list {
        validate_problem_list(&result)?;
    }
    Ok(result)
}
