//! Single-turn chat agent: one request, then either text or dispatched tool calls.
//!
//! Each `execute` builds a fresh two-message conversation (system + user);
//! no history carries over. Tool calls run sequentially in the order the
//! model emitted them, and a failing call never stops its siblings.

use crate::error::{InferenceError, ToolError};
use crate::inference::ChatBackend;
use crate::tools::ToolRegistry;
use crate::types::*;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown in place of model output when a round trip yields nothing usable.
pub const UNAVAILABLE_TEXT: &str = "Agent failed to get a valid response from the API.";

/// Outcome of one agent round trip.
#[derive(Debug)]
pub enum AgentTurn {
    /// Model answered with plain content (possibly empty).
    Text(String),
    /// Model requested tools; one result per call, in call order.
    ToolResults(Vec<ToolResult>),
    /// The chat backend failed; no retry was attempted.
    Unavailable(InferenceError),
}

impl AgentTurn {
    /// Text content, or the fixed diagnostic for an unavailable backend.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Unavailable(_) => Some(UNAVAILABLE_TEXT),
            Self::ToolResults(_) => None,
        }
    }

    pub fn tool_results(&self) -> &[ToolResult] {
        match self {
            Self::ToolResults(results) => results,
            _ => &[],
        }
    }

    /// True when at least one tool ran and none failed.
    pub fn all_tools_succeeded(&self) -> bool {
        let results = self.tool_results();
        !results.is_empty() && results.iter().all(|r| r.success)
    }
}

/// A model configured with a role prompt and a capability set.
#[derive(Clone)]
pub struct ChatAgent {
    name: String,
    system_prompt: String,
    registry: ToolRegistry,
    backend: Arc<dyn ChatBackend>,
}

impl ChatAgent {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        registry: ToolRegistry,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            registry,
            backend,
        }
    }

    /// Run one stateless round trip for `user_prompt`.
    pub async fn execute(&self, user_prompt: &str) -> AgentTurn {
        let messages = [
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(user_prompt),
        ];
        let tool_defs = self.registry.definitions();

        let response = match self.backend.chat(&messages, &tool_defs).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("[{}] {}", self.name, e);
                return AgentTurn::Unavailable(e);
            }
        };

        if response.tool_calls.is_empty() {
            let content = response.content.unwrap_or_default();
            debug!("[{}] text response: {} chars", self.name, content.len());
            return AgentTurn::Text(content);
        }

        let mut results = Vec::with_capacity(response.tool_calls.len());
        for call in &response.tool_calls {
            info!("[{}] Tool: {}({})", self.name, call.name, call.arguments);
            let result = self.dispatch(call).await;
            if result.success {
                info!("[{}] Tool result: {} chars", self.name, result.output.len());
            } else {
                warn!("[{}] Tool error: {}", self.name, result.output);
            }
            results.push(result);
        }

        AgentTurn::ToolResults(results)
    }

    async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.registry.get(&call.name) else {
            return ToolResult {
                tool_call_id: call.id.clone(),
                name: call.name.clone(),
                output: format!("Error: Tool '{}' not found.", call.name),
                success: false,
            };
        };

        let outcome = match decode_arguments(&call.arguments) {
            Ok(args) => tool.execute(args).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(output) => ToolResult {
                tool_call_id: call.id.clone(),
                name: call.name.clone(),
                output,
                success: true,
            },
            Err(e) => ToolResult {
                tool_call_id: call.id.clone(),
                name: call.name.clone(),
                output: format!("Error executing tool: {e}"),
                success: false,
            },
        }
    }
}

/// Decode a tool call's JSON argument string into a keyword map.
fn decode_arguments(raw: &str) -> Result<Map<String, Value>, ToolError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ToolError::InvalidArguments(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(ToolError::InvalidArguments(e.to_string())),
    }
}
