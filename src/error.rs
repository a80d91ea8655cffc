use serde_json::json;

/// Error type shared by the relay handlers, transport and stream layers.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("{0}")]
    Config(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Upstream API error: {status} - {message}")]
    Upstream { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Frame parse error: {0}")]
    FrameParse(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Broad error category for status code selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidRequest,
    ServerError,
}

impl RelayError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            RelayError::InvalidRequest(_) => ErrorCategory::InvalidRequest,
            // Upstream failures are reported as our own 500, never mirrored.
            RelayError::Config(_)
            | RelayError::Upstream { .. }
            | RelayError::Transport(_)
            | RelayError::FrameParse(_)
            | RelayError::Decode(_)
            | RelayError::Internal(_) => ErrorCategory::ServerError,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        http_status_for_category(self.category())
    }
}

fn http_status_for_category(cat: ErrorCategory) -> http::StatusCode {
    match cat {
        ErrorCategory::InvalidRequest => http::StatusCode::BAD_REQUEST,
        ErrorCategory::ServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Format an error as `(status_code, {"error": message})`.
#[must_use]
pub fn format_error(err: &RelayError) -> (http::StatusCode, serde_json::Value) {
    (err.status_code(), json!({ "error": err.to_string() }))
}

impl axum::response::IntoResponse for RelayError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = format_error(&self);
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message_is_bare() {
        let err = RelayError::Config("GROQ_API_KEY is not set".to_string());
        let (status, body) = format_error(&err);
        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "GROQ_API_KEY is not set" }));
    }

    #[test]
    fn test_upstream_error_carries_status() {
        let err = RelayError::Upstream {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_invalid_request_maps_to_400() {
        let err = RelayError::InvalidRequest("messages must not be empty".to_string());
        assert_eq!(err.category(), ErrorCategory::InvalidRequest);
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
    }
}
