//! Inbound request/response shapes used by the browser client.

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Body of `POST /api/stream-chat/groq`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Parse and validate an inbound chat body.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidRequest`] when the body is not JSON, lacks a
    /// `messages` list, contains an unknown role, or the list is empty.
    pub fn from_slice(body: &[u8]) -> Result<Self, RelayError> {
        let request: ChatRequest = serde_json::from_slice(body)
            .map_err(|e| RelayError::InvalidRequest(format!("malformed chat body: {e}")))?;
        if request.messages.is_empty() {
            return Err(RelayError::InvalidRequest(
                "messages must not be empty".to_string(),
            ));
        }
        Ok(request)
    }
}

/// Body of `POST /api/generate-problem/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemListRequest {
    pub query: String,
}

impl ProblemListRequest {
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidRequest`] when the body is not JSON or has no
    /// string `query` field.
    pub fn from_slice(body: &[u8]) -> Result<Self, RelayError> {
        serde_json::from_slice(body)
            .map_err(|e| RelayError::InvalidRequest(format!("malformed list body: {e}")))
    }

    /// Single user message asking the model for a raw JSON array of problems.
    #[must_use]
    pub fn to_messages(&self, problem_count: u32) -> Vec<ChatMessage> {
        let content = format!(
            "You are a strict API. Return a JSON array of {problem_count} algorithmic coding interview problems related to \"{}\".\n\
             Output format: [{{\"id\": string, \"title\": string, \"difficulty\": \"Easy\"|\"Medium\"|\"Hard\"}}]\n\
             Do not output markdown. Return ONLY the raw JSON array.",
            self.query
        );
        vec![ChatMessage {
            role: ChatRole::User,
            content,
        }]
    }
}

/// Response of the list endpoint; `result` is the model's raw text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemListResponse {
    pub result: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One entry of the problem list the client renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSummary {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
}

/// Check that `raw` is a JSON array of [`ProblemSummary`] objects.
///
/// # Errors
///
/// Returns [`RelayError::Decode`] when the text does not match that schema.
pub fn validate_problem_list(raw: &str) -> Result<Vec<ProblemSummary>, RelayError> {
    serde_json::from_str(raw.trim())
        .map_err(|e| RelayError::Decode(format!("problem list is not a valid JSON array: {e}")))
}
