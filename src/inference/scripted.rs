//! Canned chat backend for tests.

use super::ChatBackend;
use crate::error::InferenceError;
use crate::tools::ToolDefinition;
use crate::types::{ChatMessage, InferenceResponse, ToolCall};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A request as the backend saw it.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub tool_names: Vec<String>,
}

/// Replays queued responses in order; an exhausted script yields `EmptyChoices`.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<InferenceResponse, InferenceError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(self, content: &str) -> Self {
        self.push(Ok(InferenceResponse {
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
        }))
    }

    pub fn tool_calls(self, calls: &[(&str, &str)]) -> Self {
        let tool_calls = calls
            .iter()
            .enumerate()
            .map(|(i, (name, args))| ToolCall {
                id: format!("call_{i}"),
                name: name.to_string(),
                arguments: args.to_string(),
            })
            .collect();
        self.push(Ok(InferenceResponse {
            content: None,
            tool_calls,
        }))
    }

    pub fn failure(self, err: InferenceError) -> Self {
        self.push(Err(err))
    }

    fn push(self, resp: Result<InferenceResponse, InferenceError>) -> Self {
        self.responses.lock().unwrap().push_back(resp);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<InferenceResponse, InferenceError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(InferenceError::EmptyChoices))
    }
}
