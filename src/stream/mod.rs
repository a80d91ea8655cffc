pub mod relay;
pub mod sse;

pub use relay::{relay_text_stream, RelayContext, RelayPhase, RelayStats};
pub use sse::{SseLine, SseLineDecoder};
