//! Wire types for the OpenAI-compatible chat-completions endpoint.
//!
//! Response types are deliberately lenient: every nested segment is optional so
//! control records (role announcements, usage trailers) deserialize cleanly.

use serde::{Deserialize, Serialize};

use super::interview::ChatMessage;

/// Chat-completion request body sent upstream.
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    pub temperature: f64,
}

/// One streamed `data:` record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiStreamChunk {
    #[serde(default)]
    pub choices: Vec<OpenAiStreamChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiStreamChoice {
    #[serde(default)]
    pub delta: Option<OpenAiDelta>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Non-streaming completion response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiChatResponse {
    #[serde(default)]
    pub choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiChoice {
    #[serde(default)]
    pub message: Option<OpenAiResponseMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl OpenAiChatResponse {
    /// `choices[0].message.content`, if present.
    #[must_use]
    pub fn first_message_content(&self) -> Option<&str> {
        self.choices
            .first()?
            .message
            .as_ref()?
            .content
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::interview::ChatRole;

    #[test]
    fn test_request_serializes_in_wire_shape() {
        let messages = vec![
            ChatMessage {
                role: ChatRole::System,
                content: "You are an interviewer.".to_string(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: "Hi".to_string(),
            },
        ];
        let request = OpenAiChatRequest {
            model: "llama-3.3-70b-versatile",
            messages: &messages,
            stream: true,
            temperature: 0.7,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "llama-3.3-70b-versatile");
        assert_eq!(value["stream"], true);
        assert_eq!(value["temperature"], 0.7);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "Hi");
    }

    #[test]
    fn test_response_first_message_content() {
        let response: OpenAiChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"[]"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.first_message_content(), Some("[]"));

        let empty: OpenAiChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(empty.first_message_content(), None);
    }
}
