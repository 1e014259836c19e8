//! OpenAI-compatible chat completions gateway.
//!
//! Speaks the `/chat/completions` and `/embeddings` wire format, which is
//! also served by vLLM, LM Studio and most hosted providers. Tool calls
//! arrive as `tool_calls[].function` with a JSON-encoded argument string
//! and are normalized into [`ToolRequest`] before crossing the port.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tenderag_domain::{Message, ToolRequest};
use tenderag_application::ports::llm_gateway::{ChatOutcome, GatewayError, LlmGateway};
use tracing::debug;

/// Gateway for OpenAI-compatible HTTP APIs.
pub struct OpenAiGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    chat_model: String,
    embed_model: String,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl OpenAiGateway {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        chat_model: impl Into<String>,
        embed_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Other(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            chat_model: chat_model.into(),
            embed_model: embed_model.into(),
        })
    }

    fn request(&self, url: String) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .request(url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(GatewayError::ModelNotAvailable(format!(
                    "{path} returned 404: {body}"
                )));
            }
            return Err(GatewayError::RequestFailed(format!(
                "{path} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GatewayError::RequestFailed(format!("Invalid JSON from {path}: {e}")))
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn chat_complete(
        &self,
        messages: &[Message],
        tools: &[serde_json::Value],
    ) -> Result<ChatOutcome, GatewayError> {
        let wire_messages: Vec<WireMessage> = messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.chat_model,
            "messages": wire_messages,
        });
        if !tools.is_empty() {
            body["tools"] = serde_json::Value::Array(
                tools
                    .iter()
                    .map(|t| serde_json::json!({"type": "function", "function": t}))
                    .collect(),
            );
        }

        debug!(
            "OpenAI chat request: {} messages, {} tools",
            messages.len(),
            tools.len()
        );

        let response = self.post_json("/chat/completions", body).await?;
        parse_chat_response(&response)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        let body = serde_json::json!({
            "model": self.embed_model,
            "input": text,
        });
        let response = self.post_json("/embeddings", body).await?;
        parse_embedding_response(&response)
    }
}

pub(crate) fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

/// Parse a chat completions response into a normalized [`ChatOutcome`].
fn parse_chat_response(response: &serde_json::Value) -> Result<ChatOutcome, GatewayError> {
    let message = response
        .pointer("/choices/0/message")
        .ok_or_else(|| GatewayError::RequestFailed("Response has no choices".to_string()))?;

    let text = message
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .to_string();

    let mut requested_tool_calls = Vec::new();
    if let Some(calls) = message.get("tool_calls").and_then(|c| c.as_array()) {
        for call in calls {
            let Some(function) = call.get("function") else {
                continue;
            };
            let Some(name) = function.get("name").and_then(|n| n.as_str()) else {
                continue;
            };
            // Arguments are a JSON-encoded string in this wire format
            let arguments: HashMap<String, serde_json::Value> = function
                .get("arguments")
                .and_then(|a| a.as_str())
                .and_then(|s| serde_json::from_str(s).ok())
                .unwrap_or_default();
            requested_tool_calls.push(ToolRequest {
                tool_name: name.to_string(),
                arguments,
            });
        }
    }

    Ok(ChatOutcome {
        text,
        requested_tool_calls,
    })
}

fn parse_embedding_response(response: &serde_json::Value) -> Result<Vec<f32>, GatewayError> {
    let embedding = response
        .pointer("/data/0/embedding")
        .and_then(|e| e.as_array())
        .ok_or_else(|| GatewayError::RequestFailed("Response has no embedding".to_string()))?;

    Ok(embedding
        .iter()
        .filter_map(|v| v.as_f64())
        .map(|v| v as f32)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_response() {
        let response = serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "The budget is 1.2M EUR."}
            }]
        });
        let outcome = parse_chat_response(&response).unwrap();
        assert_eq!(outcome.text, "The budget is 1.2M EUR.");
        assert!(outcome.requested_tool_calls.is_empty());
    }

    #[test]
    fn test_parse_tool_call_with_string_arguments() {
        let response = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "get_notice_details",
                            "arguments": "{\"notice_id\": \"N-2024-001\"}"
                        }
                    }]
                }
            }]
        });
        let outcome = parse_chat_response(&response).unwrap();
        assert_eq!(outcome.text, "");
        assert_eq!(outcome.requested_tool_calls.len(), 1);
        let call = &outcome.requested_tool_calls[0];
        assert_eq!(call.tool_name, "get_notice_details");
        assert_eq!(call.get_string("notice_id"), Some("N-2024-001"));
    }

    #[test]
    fn test_parse_malformed_arguments_yield_empty_map() {
        let response = serde_json::json!({
            "choices": [{
                "message": {
                    "content": "",
                    "tool_calls": [{
                        "function": {"name": "search_notices", "arguments": "not json"}
                    }]
                }
            }]
        });
        let outcome = parse_chat_response(&response).unwrap();
        assert_eq!(outcome.requested_tool_calls.len(), 1);
        assert!(outcome.requested_tool_calls[0].arguments.is_empty());
    }

    #[test]
    fn test_parse_missing_choices_is_an_error() {
        let response = serde_json::json!({"error": {"message": "overloaded"}});
        assert!(parse_chat_response(&response).is_err());
    }

    #[test]
    fn test_parse_embedding() {
        let response = serde_json::json!({
            "data": [{"embedding": [0.1, -0.5, 0.25]}]
        });
        let embedding = parse_embedding_response(&response).unwrap();
        assert_eq!(embedding.len(), 3);
        assert!((embedding[1] - (-0.5)).abs() < 1e-6);
    }
}
