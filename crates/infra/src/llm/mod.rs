//! Chat-completions client behind the intent-model port

mod client;
mod types;

pub use client::ChatClient;
pub use types::{ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Usage};
