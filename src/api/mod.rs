pub(crate) mod common;
pub mod health;
pub mod problem_list;
pub mod stream_chat;
