mod streaming;

pub(crate) use streaming::text_stream_response;

use axum::response::{IntoResponse, Response};

use crate::error::RelayError;

/// Log a handler failure and render it as the `{error}` JSON response.
pub(crate) fn error_response(err: RelayError, request_id: &uuid::Uuid, route: &'static str) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(%request_id, route, status = status.as_u16(), error = %err, "request failed");
    } else {
        tracing::warn!(%request_id, route, status = status.as_u16(), error = %err, "request rejected");
    }
    err.into_response()
}
