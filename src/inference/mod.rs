pub mod client;
#[cfg(test)]
pub(crate) mod scripted;

pub use client::OpenRouterClient;

use crate::error::InferenceError;
use crate::tools::ToolDefinition;
use crate::types::{ChatMessage, InferenceResponse};
use async_trait::async_trait;

/// One chat-completion round trip.
///
/// `Err` covers every "no usable response" case, including an empty choice
/// list; callers never retry.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<InferenceResponse, InferenceError>;
}
