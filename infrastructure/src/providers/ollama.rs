//! Ollama gateway.
//!
//! Speaks Ollama's native `/api/chat` and `/api/embeddings` formats. Unlike
//! the OpenAI wire format, tool call arguments arrive as a JSON object, not
//! an encoded string.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tenderag_domain::{Message, ToolRequest};
use tenderag_application::ports::llm_gateway::{ChatOutcome, GatewayError, LlmGateway};
use tracing::debug;

use super::openai::map_transport_error;

/// Gateway for a local or remote Ollama server.
pub struct OllamaGateway {
    client: reqwest::Client,
    base_url: String,
    chat_model: String,
    embed_model: String,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl OllamaGateway {
    pub fn new(
        base_url: impl Into<String>,
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
            chat_model: chat_model.into(),
            embed_model: embed_model.into(),
        })
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(url)
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
impl LlmGateway for OllamaGateway {
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
            "stream": false,
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
            "Ollama chat request: {} messages, {} tools",
            messages.len(),
            tools.len()
        );

        let response = self.post_json("/api/chat", body).await?;
        parse_chat_response(&response)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        let body = serde_json::json!({
            "model": self.embed_model,
            "prompt": text,
        });
        let response = self.post_json("/api/embeddings", body).await?;
        parse_embedding_response(&response)
    }
}

fn parse_chat_response(response: &serde_json::Value) -> Result<ChatOutcome, GatewayError> {
    let message = response
        .get("message")
        .ok_or_else(|| GatewayError::RequestFailed("Response has no message".to_string()))?;

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
            // Arguments are a plain JSON object in this wire format
            let arguments: HashMap<String, serde_json::Value> = function
                .get("arguments")
                .and_then(|a| a.as_object())
                .map(|o| o.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
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
        .get("embedding")
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
            "model": "llama3.1",
            "message": {"role": "assistant", "content": "Hello!"},
            "done": true
        });
        let outcome = parse_chat_response(&response).unwrap();
        assert_eq!(outcome.text, "Hello!");
        assert!(outcome.requested_tool_calls.is_empty());
    }

    #[test]
    fn test_parse_tool_call_with_object_arguments() {
        let response = serde_json::json!({
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [{
                    "function": {
                        "name": "search_notices",
                        "arguments": {"query": "road construction", "limit": 5}
                    }
                }]
            }
        });
        let outcome = parse_chat_response(&response).unwrap();
        assert_eq!(outcome.requested_tool_calls.len(), 1);
        let call = &outcome.requested_tool_calls[0];
        assert_eq!(call.tool_name, "search_notices");
        assert_eq!(call.get_string("query"), Some("road construction"));
        assert_eq!(call.get_i64("limit"), Some(5));
    }

    #[test]
    fn test_parse_missing_message_is_an_error() {
        let response = serde_json::json!({"error": "model not loaded"});
        assert!(parse_chat_response(&response).is_err());
    }

    #[test]
    fn test_parse_embedding() {
        let response = serde_json::json!({"embedding": [1.0, 0.0, -1.0]});
        let embedding = parse_embedding_response(&response).unwrap();
        assert_eq!(embedding, vec![1.0, 0.0, -1.0]);
    }
}
