//! Hosted model API integration.
//!
//! Wraps the Anthropic Messages API for the chat widget: a full tool-use
//! capable `chat` call for the conversation handlers, and a cheap
//! deterministic `completion` call used by the intent classifier and the
//! formulation extractor.

mod client;
mod error;
mod types;

pub use client::LlmClient;
pub use error::{ApiErrorResponse, LlmError};
pub use types::{
    ChatRequest, ChatResponse, ContentBlock, Message, MessageContent, StopReason, Tool, Usage,
};
