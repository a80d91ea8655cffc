//! `POST /api/stream-chat/groq`: relay an interviewer reply as plain text.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::response::Response;
use bytes::Bytes;

use crate::api::common::{error_response, text_stream_response};
use crate::error::RelayError;
use crate::observability::token_counter::estimate_prompt_tokens;
use crate::protocol::ChatRequest;
use crate::state::AppState;
use crate::stream::relay::{relay_text_stream, RelayContext, RelayPhase};

const ROUTE: &str = "stream_chat";

pub async fn handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request_id = state.next_request_id();
    match handler_inner(&state, request_id, &body).await {
        Ok(response) => response,
        Err(err) => error_response(err, &request_id, ROUTE),
    }
}

async fn handler_inner(
    state: &AppState,
    request_id: uuid::Uuid,
    body: &[u8],
) -> Result<Response, RelayError> {
    let request = ChatRequest::from_slice(body)?;
    let mut ctx = RelayContext::new(request_id);

    ctx.advance(RelayPhase::AwaitingUpstream);
    tracing::debug!(
        %request_id,
        messages = request.messages.len(),
        estimated_prompt_tokens = estimate_prompt_tokens(&request.messages),
        "opening upstream stream"
    );

    let upstream = match state.upstream.open_stream(&request.messages).await {
        Ok(upstream) => upstream,
        Err(err) => {
            ctx.advance(RelayPhase::Errored);
            return Err(err);
        }
    };
    ctx.advance(RelayPhase::Streaming);

    let fragments = relay_text_stream(upstream.into_byte_stream(), ctx);
    Ok(text_stream_response(Body::from_stream(fragments)))
}
