//! Line-oriented SSE decoder for OpenAI-compatible completion streams.
//!
//! Bytes arrive in arbitrary chunks: a chunk may end in the middle of a line,
//! in the middle of the `data: ` prefix, or in the middle of a multi-byte
//! UTF-8 character. The decoder holds both kinds of partial input until the
//! rest shows up, and only ever classifies a line once its `\n` has been seen.

use futures_util::{Stream, StreamExt};
use memchr::memchr_iter;
use smallvec::SmallVec;

/// Terminal sentinel payload.
pub const DONE_PAYLOAD: &str = "[DONE]";

const DATA_PREFIX: &str = "data: ";

/// One complete, relevant SSE line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Text after the `data: ` prefix.
    Data(String),
    /// `data: [DONE]`; nothing after it is decoded.
    Done,
}

/// Incremental, per-request SSE line decoder.
pub struct SseLineDecoder {
    buffer: String,
    read_offset: usize,
    utf8_remainder: Vec<u8>,
    done: bool,
}

impl SseLineDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            read_offset: 0,
            utf8_remainder: Vec::new(),
            done: false,
        }
    }

    /// True once the `[DONE]` sentinel has been decoded.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed raw bytes and return any complete lines decoded.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseLine> {
        let mut out = Vec::new();
        self.feed_into(chunk, &mut out);
        out
    }

    /// Feed raw bytes and append complete lines into a caller-provided buffer.
    ///
    /// Rules:
    /// - lines are split on `\n`; surrounding whitespace (including `\r`) is trimmed
    /// - lines not starting with `data: ` are dropped (comments, `event:`,
    ///   keep-alives, blank separators)
    /// - `data: [DONE]` yields [`SseLine::Done`] and ends decoding
    pub fn feed_into(&mut self, chunk: &[u8], out: &mut Vec<SseLine>) {
        if self.done {
            return;
        }
        if self.utf8_remainder.is_empty() {
            self.decode_utf8(chunk);
        } else {
            let mut joined = std::mem::take(&mut self.utf8_remainder);
            joined.extend_from_slice(chunk);
            self.decode_utf8(&joined);
        }
        self.drain_lines(out);
    }

    /// Drop any unterminated trailing input and return how many bytes were discarded.
    pub fn finish(&mut self) -> usize {
        let discarded = (self.buffer.len() - self.read_offset) + self.utf8_remainder.len();
        self.buffer.clear();
        self.read_offset = 0;
        self.utf8_remainder.clear();
        discarded
    }

    fn decode_utf8(&mut self, mut bytes: &[u8]) {
        loop {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    return;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    if let Ok(valid) = std::str::from_utf8(&bytes[..valid_up_to]) {
                        self.buffer.push_str(valid);
                    }
                    match e.error_len() {
                        Some(invalid_len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            bytes = &bytes[valid_up_to + invalid_len..];
                        }
                        // Incomplete sequence at the end: wait for the next chunk.
                        None => {
                            self.utf8_remainder
                                .extend_from_slice(&bytes[valid_up_to..]);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn drain_lines(&mut self, out: &mut Vec<SseLine>) {
        let mut processed_up_to = self.read_offset;
        let bytes = self.buffer.as_bytes();
        let scan_start = processed_up_to;
        for rel_pos in memchr_iter(b'\n', &bytes[scan_start..]) {
            let line_end = scan_start + rel_pos;
            let line = &self.buffer[processed_up_to..line_end];
            processed_up_to = line_end + 1;
            match classify_line(line) {
                Some(SseLine::Done) => {
                    out.push(SseLine::Done);
                    self.done = true;
                    break;
                }
                Some(line) => out.push(line),
                None => {}
            }
        }

        if self.done {
            self.finish();
            return;
        }

        self.read_offset = processed_up_to;
        if self.read_offset == self.buffer.len() {
            self.buffer.clear();
            self.read_offset = 0;
            return;
        }
        let should_compact = self.read_offset > 0
            && (self.read_offset >= self.buffer.len() / 2 || self.read_offset >= 8 * 1024);
        if should_compact {
            self.buffer.drain(..self.read_offset);
            self.read_offset = 0;
        }
    }
}

impl Default for SseLineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify one complete line (terminator already stripped).
#[must_use]
pub fn classify_line(line: &str) -> Option<SseLine> {
    let payload = line.trim().strip_prefix(DATA_PREFIX)?;
    if payload == DONE_PAYLOAD {
        Some(SseLine::Done)
    } else {
        Some(SseLine::Data(payload.to_owned()))
    }
}

struct PendingLines {
    lines: SmallVec<[SseLine; 8]>,
    head: usize,
}

impl PendingLines {
    #[inline]
    fn new() -> Self {
        Self {
            lines: SmallVec::new(),
            head: 0,
        }
    }

    #[inline]
    fn extend_from_vec(&mut self, lines: &mut Vec<SseLine>) {
        self.lines.extend(lines.drain(..));
    }

    #[inline]
    fn pop_front(&mut self) -> Option<SseLine> {
        if self.head >= self.lines.len() {
            return None;
        }
        let line = std::mem::replace(&mut self.lines[self.head], SseLine::Done);
        self.head += 1;
        if self.head == self.lines.len() {
            self.lines.clear();
            self.head = 0;
        }
        Some(line)
    }
}

/// Split an upstream byte stream into complete SSE data lines.
///
/// The next chunk is only pulled once every line decoded from the previous one
/// has been taken. After [`SseLine::Done`] nothing more is read and the stream
/// ends; at upstream EOF the unterminated tail is discarded. A read error is
/// yielded once and ends the stream.
pub fn sse_data_stream<S, E>(byte_stream: S) -> impl Stream<Item = Result<SseLine, E>> + Send
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Send + 'static,
    E: Send + 'static,
{
    futures_util::stream::unfold(
        (
            Box::pin(byte_stream),
            SseLineDecoder::new(),
            Vec::<SseLine>::with_capacity(8),
            PendingLines::new(),
            false,
        ),
        |(mut stream, mut decoder, mut decoded, mut pending, mut ended)| async move {
            loop {
                if let Some(line) = pending.pop_front() {
                    return Some((Ok(line), (stream, decoder, decoded, pending, ended)));
                }
                if ended || decoder.is_done() {
                    return None;
                }

                match stream.as_mut().next().await {
                    Some(Ok(chunk)) => {
                        decoder.feed_into(&chunk, &mut decoded);
                        pending.extend_from_vec(&mut decoded);
                    }
                    Some(Err(err)) => {
                        decoder.finish();
                        ended = true;
                        return Some((Err(err), (stream, decoder, decoded, pending, ended)));
                    }
                    None => {
                        let discarded = decoder.finish();
                        if discarded > 0 {
                            tracing::debug!(
                                discarded_bytes = discarded,
                                "dropping unterminated trailing upstream data"
                            );
                        }
                        ended = true;
                    }
                }
            }
        },
    )
}
