//! Claude API integration for model-written insights.
//!
//! Only the non-streaming Messages API is used: the insight endpoint sends a
//! single prompt and parses the complete answer.

mod client;
mod error;
mod types;

pub use client::ClaudeClient;
pub use error::ClaudeError;
pub use types::{ChatRequest, ChatResponse, ContentBlock, Message, StopReason, Usage};
