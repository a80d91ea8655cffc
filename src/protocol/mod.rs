pub mod delta;
pub mod interview;
pub mod openai_chat;

pub use delta::{extract_delta, parse_stream_chunk};
pub use interview::{ChatMessage, ChatRequest, ChatRole, ProblemListRequest, ProblemListResponse};
pub use openai_chat::{OpenAiChatRequest, OpenAiChatResponse, OpenAiStreamChunk};
