use std::fmt;
use std::time::Instant;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use crate::error::RelayError;
use crate::observability::log_relay_complete;
use crate::protocol::delta::{extract_delta, parse_stream_chunk};

use super::sse::{sse_data_stream, SseLine};

/// Lifecycle of one relayed chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayPhase {
    Idle,
    AwaitingUpstream,
    Streaming,
    Closed,
    Errored,
}

impl RelayPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, RelayPhase::Closed | RelayPhase::Errored)
    }

    #[must_use]
    pub fn can_transition_to(self, next: RelayPhase) -> bool {
        match (self, next) {
            (RelayPhase::Idle, RelayPhase::AwaitingUpstream)
            | (RelayPhase::AwaitingUpstream, RelayPhase::Streaming)
            | (RelayPhase::Streaming, RelayPhase::Streaming | RelayPhase::Closed) => true,
            (current, RelayPhase::Errored) => !current.is_terminal(),
            _ => false,
        }
    }

    /// Move to `next`, staying put on an illegal transition.
    #[must_use]
    pub fn transition(self, next: RelayPhase, request_id: &uuid::Uuid) -> RelayPhase {
        if self.can_transition_to(next) {
            tracing::debug!(%request_id, from = ?self, to = ?next, "relay phase change");
            next
        } else {
            tracing::warn!(%request_id, from = ?self, to = ?next, "ignored illegal relay phase change");
            self
        }
    }
}

/// Counters reported when a relay finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub data_lines: u64,
    pub fragments: u64,
    pub bytes: u64,
    pub skipped_lines: u64,
}

/// Per-request relay context: correlation id, start time and the one phase
/// tracked for the whole request.
#[derive(Debug, Clone)]
pub struct RelayContext {
    pub request_id: uuid::Uuid,
    pub started: Instant,
    phase: RelayPhase,
}

impl RelayContext {
    #[must_use]
    pub fn new(request_id: uuid::Uuid) -> Self {
        Self {
            request_id,
            started: Instant::now(),
            phase: RelayPhase::Idle,
        }
    }

    #[must_use]
    pub fn phase(&self) -> RelayPhase {
        self.phase
    }

    /// Apply a phase change, returning the resulting phase.
    pub fn advance(&mut self, next: RelayPhase) -> RelayPhase {
        self.phase = self.phase.transition(next, &self.request_id);
        self.phase
    }
}

struct RelayState<L> {
    lines: std::pin::Pin<Box<L>>,
    stats: RelayStats,
    ctx: RelayContext,
    ended: bool,
}

impl<L> RelayState<L> {
    /// Turn one data line into an outbound fragment, if it carries any text.
    fn fragment_from(&mut self, payload: &str) -> Option<Bytes> {
        self.stats.data_lines += 1;
        match parse_stream_chunk(payload) {
            Ok(record) => {
                let text = extract_delta(&record).filter(|text| !text.is_empty())?;
                self.stats.fragments += 1;
                self.stats.bytes += text.len() as u64;
                Some(Bytes::copy_from_slice(text.as_bytes()))
            }
            Err(err) => {
                self.stats.skipped_lines += 1;
                let err = RelayError::FrameParse(err.to_string());
                tracing::warn!(
                    request_id = %self.ctx.request_id,
                    error = %err,
                    "skipping malformed upstream SSE line"
                );
                None
            }
        }
    }

    fn close(&mut self) {
        self.ended = true;
        self.ctx.advance(RelayPhase::Closed);
        log_relay_complete(&self.ctx.request_id, &self.stats, self.ctx.started);
    }

    fn fail(&mut self, err: &RelayError) {
        self.ended = true;
        self.ctx.advance(RelayPhase::Errored);
        tracing::warn!(
            request_id = %self.ctx.request_id,
            error = %err,
            fragments = self.stats.fragments,
            "upstream stream aborted"
        );
    }
}

/// Re-frame an upstream SSE byte stream as a flat stream of text fragments.
///
/// Each item is one non-empty `choices[0].delta.content` value, in arrival order,
/// with no delimiters. Lines are pulled from [`sse_data_stream`] one at a time, so
/// the next upstream chunk is only read once the consumer has taken every
/// fragment of the current one. The stream ends cleanly on `[DONE]` or upstream
/// EOF, and ends with one `Err` if the upstream read fails.
///
/// `ctx` is expected in [`RelayPhase::Streaming`]; it ends `Closed` or `Errored`.
pub fn relay_text_stream<S, E>(
    byte_stream: S,
    ctx: RelayContext,
) -> impl Stream<Item = Result<Bytes, RelayError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let state = RelayState {
        lines: Box::pin(sse_data_stream(byte_stream)),
        stats: RelayStats::default(),
        ctx,
        ended: false,
    };

    futures_util::stream::unfold(state, |mut state| async move {
        loop {
            if state.ended || state.ctx.phase().is_terminal() {
                return None;
            }

            match state.lines.as_mut().next().await {
                Some(Ok(SseLine::Data(payload))) => {
                    if let Some(fragment) = state.fragment_from(&payload) {
                        return Some((Ok(fragment), state));
                    }
                }
                Some(Ok(SseLine::Done)) | None => state.close(),
                Some(Err(err)) => {
                    let err = RelayError::Transport(format!("upstream stream read failed: {err}"));
                    state.fail(&err);
                    return Some((Err(err), state));
                }
            }
        }
    })
}
