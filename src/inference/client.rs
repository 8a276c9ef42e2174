//! Chat completion via the OpenRouter API.
//!
//! Supports tool-use (function calling) in the OpenAI-compatible format.

use super::ChatBackend;
use crate::config::ForgeConfig;
use crate::error::InferenceError;
use crate::tools::ToolDefinition;
use crate::types::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Longest slice of the user prompt echoed into debug logs.
const LOG_PREVIEW_CHARS: usize = 300;

/// Chat-completion client for OpenRouter (or any OpenAI-compatible endpoint).
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    base_url: String,
    api_key: String,
    model: String,
    site_url: String,
    site_name: String,
    temperature: f64,
    timeout_secs: u64,
    http: reqwest::Client,
}

// -- OpenAI-compatible request/response types --------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<MessagePayload<'a>>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolPayload<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    role: String,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ToolPayload<'a> {
    r#type: &'a str,
    function: FunctionPayload<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionPayload<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ToolCallPayload {
    #[serde(default)]
    id: String,
    function: FunctionCallPayload,
}

#[derive(Debug, Deserialize)]
struct FunctionCallPayload {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallPayload>>,
}

impl OpenRouterClient {
    /// Create a client from the loaded configuration.
    pub fn from_config(config: &ForgeConfig) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            site_url: config.site_url.clone(),
            site_name: config.site_name.clone(),
            temperature: config.temperature,
            timeout_secs: config.request_timeout_secs,
            http,
        })
    }

    fn build_request<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        tools: &'a [ToolDefinition],
    ) -> ChatRequest<'a> {
        let messages = messages
            .iter()
            .map(|m| MessagePayload {
                role: m.role.to_string(),
                content: &m.content,
            })
            .collect();

        let tools: Option<Vec<ToolPayload>> = if tools.is_empty() {
            None
        } else {
            Some(
                tools
                    .iter()
                    .map(|t| ToolPayload {
                        r#type: "function",
                        function: FunctionPayload {
                            name: &t.name,
                            description: &t.description,
                            parameters: &t.parameters,
                        },
                    })
                    .collect(),
            )
        };

        ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            tool_choice: tools.as_ref().map(|_| "auto"),
            tools,
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> InferenceError {
        if err.is_timeout() {
            InferenceError::Timeout(self.timeout_secs)
        } else {
            InferenceError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ChatBackend for OpenRouterClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<InferenceResponse, InferenceError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = self.build_request(messages, tools);

        if let Some(last) = messages.last() {
            let preview: String = last.content.chars().take(LOG_PREVIEW_CHARS).collect();
            debug!(
                "Chat request to {} ({} messages, {} tools): {}",
                self.model,
                messages.len(),
                tools.len(),
                preview
            );
        }

        let mut builder = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request);
        if !self.site_url.is_empty() {
            builder = builder.header("HTTP-Referer", &self.site_url);
        }
        if !self.site_name.is_empty() {
            builder = builder.header("X-Title", &self.site_name);
        }

        let resp = builder.send().await.map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| InferenceError::Decode(e.to_string()))?;

        parse_first_choice(body)
    }
}

fn parse_first_choice(body: ChatResponse) -> Result<InferenceResponse, InferenceError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or(InferenceError::EmptyChoices)?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCall {
            id: tc.id,
            name: tc.function.name,
            arguments: tc.function.arguments,
        })
        .collect();

    Ok(InferenceResponse {
        content: choice.message.content,
        tool_calls,
    })
}
