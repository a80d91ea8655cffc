use crate::protocol::ChatMessage;
use crate::stream::relay::RelayStats;
use std::time::Duration;
use tracing::info;

/// Estimate the number of tokens in `text`.
///
/// Uses a lightweight heuristic (`bytes / 4`) to avoid loading model BPE tables.
#[must_use]
pub fn estimate_tokens(text: &str) -> u64 {
    (text.len() as u64).div_ceil(4)
}

/// Estimate the prompt tokens of a conversation history.
#[must_use]
pub fn estimate_prompt_tokens(messages: &[ChatMessage]) -> u64 {
    messages
        .iter()
        .map(|message| estimate_tokens(&message.content))
        .sum()
}

/// Log a completed relay at INFO level.
///
/// The upstream stream carries no usage block we rely on, so output tokens are
/// estimated from the relayed byte count.
pub fn log_relay_usage(request_id: &uuid::Uuid, stats: &RelayStats, duration: Duration) {
    info!(
        %request_id,
        fragments = stats.fragments,
        relayed_bytes = stats.bytes,
        estimated_output_tokens = stats.bytes.div_ceil(4),
        skipped_lines = stats.skipped_lines,
        data_lines = stats.data_lines,
        duration_seconds = duration.as_secs_f64(),
        "relay completed"
    );
}
