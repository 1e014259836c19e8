//! Provider gateways
//!
//! Each gateway adapts one provider wire format to the [`LlmGateway`] port.
//! The provider is selected once at wiring time from configuration; nothing
//! downstream branches on the provider kind.

pub mod ollama;
pub mod openai;

pub use ollama::OllamaGateway;
pub use openai::OpenAiGateway;

use crate::config::file_config::ProviderConfig;
use std::sync::Arc;
use std::time::Duration;
use tenderag_application::ports::llm_gateway::{GatewayError, LlmGateway};
use tracing::info;

/// Supported provider families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Ollama,
}

impl ProviderKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" | "openai-compatible" => Some(ProviderKind::OpenAi),
            "ollama" => Some(ProviderKind::Ollama),
            _ => None,
        }
    }
}

/// Build the configured gateway.
pub fn build_gateway(config: &ProviderConfig) -> Result<Arc<dyn LlmGateway>, GatewayError> {
    let kind = ProviderKind::parse(&config.kind).ok_or_else(|| {
        GatewayError::Other(format!("Unknown provider kind '{}'", config.kind))
    })?;
    let timeout = Duration::from_secs(config.timeout_seconds);

    info!(
        "Using {} provider at {} (chat: {}, embed: {})",
        config.kind, config.base_url, config.chat_model, config.embed_model
    );

    match kind {
        ProviderKind::OpenAi => Ok(Arc::new(OpenAiGateway::new(
            &config.base_url,
            config.api_key.clone(),
            &config.chat_model,
            &config.embed_model,
            timeout,
        )?)),
        ProviderKind::Ollama => Ok(Arc::new(OllamaGateway::new(
            &config.base_url,
            &config.chat_model,
            &config.embed_model,
            timeout,
        )?)),
    }
}
