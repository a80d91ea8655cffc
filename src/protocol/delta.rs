use super::openai_chat::OpenAiStreamChunk;

/// Parse one SSE `data:` payload into a stream chunk.
///
/// # Errors
///
/// Returns the `serde_json` error for non-JSON or partially-JSON payloads.
pub fn parse_stream_chunk(payload: &str) -> Result<OpenAiStreamChunk, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Incremental text carried by a stream chunk: `choices[0].delta.content`.
///
/// `None` for control records (role announcement, finish, usage) and any chunk
/// missing a segment of that path.
#[must_use]
pub fn extract_delta(chunk: &OpenAiStreamChunk) -> Option<&str> {
    chunk.choices.first()?.delta.as_ref()?.content.as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta_of(payload: &str) -> Option<String> {
        let chunk = parse_stream_chunk(payload).expect("valid chunk");
        extract_delta(&chunk).map(ToOwned::to_owned)
    }

    #[test]
    fn test_extracts_content() {
        assert_eq!(
            delta_of(r#"{"id":"c1","choices":[{"index":0,"delta":{"content":"Hi"}}]}"#).as_deref(),
            Some("Hi")
        );
    }

    #[test]
    fn test_control_records_have_no_fragment() {
        assert_eq!(
            delta_of(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#),
            None
        );
        assert_eq!(
            delta_of(r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#),
            None
        );
        assert_eq!(delta_of(r#"{"choices":[]}"#), None);
        assert_eq!(delta_of(r#"{"x_groq":{"usage":{}}}"#), None);
        assert_eq!(
            delta_of(r#"{"choices":[{"delta":{"content":null}}]}"#),
            None
        );
    }

    #[test]
    fn test_only_first_choice_is_used() {
        assert_eq!(
            delta_of(r#"{"choices":[{"delta":{"content":"a"}},{"delta":{"content":"b"}}]}"#)
                .as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(parse_stream_chunk("{\"choices\":[{\"delta\":").is_err());
        assert!(parse_stream_chunk("hello").is_err());
    }
}
