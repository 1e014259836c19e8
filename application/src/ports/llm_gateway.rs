//! LLM Gateway port
//!
//! Defines the interface for communicating with LLM providers.

use async_trait::async_trait;
use tenderag_domain::{Message, ToolRequest};
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Result of one chat completion: the model's text plus any tool calls it
/// requested. Providers normalize their native tool-call wire formats into
/// [`ToolRequest`] so the application layer never sees provider JSON.
#[derive(Debug, Clone, Default)]
pub struct ChatOutcome {
    pub text: String,
    pub requested_tool_calls: Vec<ToolRequest>,
}

impl ChatOutcome {
    /// Outcome containing only text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            requested_tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_call(mut self, request: ToolRequest) -> Self {
        self.requested_tool_calls.push(request);
        self
    }

    pub fn wants_tools(&self) -> bool {
        !self.requested_tool_calls.is_empty()
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to a model provider.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// One chat completion over the full message list.
    ///
    /// `tools` is the JSON-Schema-shaped tool offer list (may be empty).
    async fn chat_complete(
        &self,
        messages: &[Message],
        tools: &[serde_json::Value],
    ) -> Result<ChatOutcome, GatewayError>;

    /// Embed a text into the provider's vector space.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError>;
}
