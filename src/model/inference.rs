//! Hosted model inference over an OpenAI-compatible chat-completions API.
//!
//! Supports tool-use (function calling): tool requests and tool results are
//! carried as `tool_calls` / `tool` messages correlated by call id.

use super::{ModelClient, TransportError};
use crate::config::AdvisorConfig;
use crate::tools::ToolDescriptor;
use crate::types::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Inference client wrapping a hosted chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    timeout: Duration,
    http: reqwest::Client,
}

// -- OpenAI-compatible request/response types --------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<MessagePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolPayload<'a>>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct MessagePayload {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCallPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl MessagePayload {
    fn text(role: &'static str, content: &str) -> Self {
        Self {
            role,
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
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
    parameters: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ToolCallPayload {
    id: String,
    #[serde(default)]
    r#type: String,
    function: FunctionCallPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FunctionCallPayload {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCallPayload>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Pricing per 1M tokens (prompt, completion) in USD.
const MODEL_PRICING: &[(&str, f64, f64)] = &[
    ("gpt-4o-mini", 0.15, 0.60),
    ("gpt-4o", 2.50, 10.00),
    ("claude-sonnet-4-5", 3.00, 15.00),
    ("claude-opus-4-5", 5.00, 25.00),
    ("claude-haiku", 0.25, 1.25),
];

impl InferenceClient {
    /// Create a client from explicit settings.
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        max_tokens: u32,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
            temperature,
            timeout,
            http,
        })
    }

    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        Self::new(
            &config.model_api_url,
            &config.model_api_key,
            &config.model,
            config.max_tokens,
            config.temperature,
            Duration::from_secs(config.model_timeout_secs),
        )
    }

    /// Estimate the USD cost of a token usage for a given model.
    pub fn cost_for_model(model: &str, usage: &TokenUsage) -> f64 {
        let (prompt_rate, completion_rate) = MODEL_PRICING
            .iter()
            .find(|(name, _, _)| model.contains(name))
            .map(|(_, p, c)| (*p, *c))
            .unwrap_or((2.50, 10.00)); // Default to gpt-4o pricing

        let prompt_cost = (usage.prompt_tokens as f64 / 1_000_000.0) * prompt_rate;
        let completion_cost = (usage.completion_tokens as f64 / 1_000_000.0) * completion_rate;
        prompt_cost + completion_cost
    }

    fn map_send_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout.as_secs())
        } else {
            TransportError::Http(err)
        }
    }
}

#[async_trait]
impl ModelClient for InferenceClient {
    async fn send(
        &self,
        conversation: &Conversation,
        tools: &[ToolDescriptor],
    ) -> Result<ModelResponse, TransportError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let tool_payloads: Option<Vec<ToolPayload>> = if tools.is_empty() {
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
                            parameters: t.json_schema(),
                        },
                    })
                    .collect(),
            )
        };

        let request = ChatRequest {
            model: &self.model,
            messages: encode_messages(conversation),
            tools: tool_payloads,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(
            "Inference request to model {} ({} turns)",
            self.model,
            conversation.len()
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| TransportError::Malformed(e.to_string()))?;

        decode_response(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn estimate_cost(&self, usage: &TokenUsage) -> f64 {
        Self::cost_for_model(&self.model, usage)
    }
}

/// Flatten the conversation into chat-completions messages.
///
/// An assistant text turn immediately followed by a tool-request turn is
/// sent as a single assistant message carrying both.
fn encode_messages(conversation: &Conversation) -> Vec<MessagePayload> {
    let mut messages = Vec::with_capacity(conversation.len() + 1);

    if !conversation.system.is_empty() {
        messages.push(MessagePayload::text("system", &conversation.system));
    }

    for turn in &conversation.turns {
        match turn {
            Turn::User { text } => messages.push(MessagePayload::text("user", text)),
            Turn::Assistant { text } => messages.push(MessagePayload::text("assistant", text)),
            Turn::ToolRequests { calls } => {
                let payloads: Vec<ToolCallPayload> = calls
                    .iter()
                    .map(|c| ToolCallPayload {
                        id: c.id.clone(),
                        r#type: "function".into(),
                        function: FunctionCallPayload {
                            name: c.name.clone(),
                            arguments: c.arguments.to_string(),
                        },
                    })
                    .collect();

                match messages.last_mut() {
                    Some(last) if last.role == "assistant" && last.tool_calls.is_none() => {
                        last.tool_calls = Some(payloads);
                    }
                    _ => messages.push(MessagePayload {
                        role: "assistant",
                        content: None,
                        tool_calls: Some(payloads),
                        tool_call_id: None,
                    }),
                }
            }
            Turn::ToolResult(result) => messages.push(MessagePayload {
                role: "tool",
                content: Some(result.output.clone()),
                tool_calls: None,
                tool_call_id: Some(result.tool_call_id.clone()),
            }),
        }
    }

    messages
}

fn decode_response(body: ChatResponse) -> Result<ModelResponse, TransportError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| TransportError::Malformed("response has no choices".into()))?;

    let usage = body
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    let content = choice.message.content.filter(|c| !c.trim().is_empty());

    if choice.message.tool_calls.is_empty() {
        let text = content.ok_or_else(|| {
            TransportError::Malformed("reply has neither text nor tool calls".into())
        })?;
        return Ok(ModelResponse {
            reply: ModelReply::Text { text },
            usage,
        });
    }

    // Unparseable arguments are passed through as a raw string; the registry
    // rejects them as invalid arguments and the model gets a chance to retry.
    let calls = choice
        .message
        .tool_calls
        .into_iter()
        .map(|tc| {
            let arguments = serde_json::from_str(&tc.function.arguments)
                .unwrap_or(serde_json::Value::String(tc.function.arguments));
            ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments,
            }
        })
        .collect();

    Ok(ModelResponse {
        reply: ModelReply::ToolCalls {
            preamble: content,
            calls,
        },
        usage,
    })
}
