//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file and
//! are deserialized directly.

use serde::{Deserialize, Serialize};
use tenderag_application::config::TurnParams;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model provider settings
    pub provider: ProviderConfig,
    /// Agent loop settings
    pub agent: AgentConfig,
    /// Retrieval settings
    pub retrieval: RetrievalConfig,
}

/// `[provider]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider family: "openai" or "ollama"
    pub kind: String,
    pub base_url: String,
    /// Bearer token, if the endpoint requires one
    pub api_key: Option<String>,
    pub chat_model: String,
    pub embed_model: String,
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            api_key: None,
            chat_model: "llama3.1".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// `[agent]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub max_review_loops: u32,
    pub approval_threshold: u8,
    pub max_tool_turns: u32,
    pub max_tool_retries: u32,
    pub history_cap: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let params = TurnParams::default();
        Self {
            max_review_loops: params.max_review_loops,
            approval_threshold: params.approval_threshold,
            max_tool_turns: params.max_tool_turns,
            max_tool_retries: params.max_tool_retries,
            history_cap: params.history_cap,
        }
    }
}

/// `[retrieval]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub k: usize,
    pub grading_enabled: bool,
    /// JSONL file of embedded chunks; no file means an empty index
    pub chunks_file: Option<String>,
    pub catalog_url: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: 5,
            grading_enabled: true,
            chunks_file: None,
            catalog_url: "http://localhost:8080".to_string(),
        }
    }
}

impl FileConfig {
    /// Project the file configuration onto the application's turn parameters.
    pub fn turn_params(&self) -> TurnParams {
        TurnParams {
            max_review_loops: self.agent.max_review_loops,
            approval_threshold: self.agent.approval_threshold,
            max_tool_turns: self.agent.max_tool_turns,
            max_tool_retries: self.agent.max_tool_retries,
            retrieval_k: self.retrieval.k,
            grading_enabled: self.retrieval.grading_enabled,
            history_cap: self.agent.history_cap,
        }
    }

    /// Sanity-check the configuration, returning human-readable warnings.
    /// Warnings never block startup.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.agent.max_review_loops == 0 {
            warnings.push(
                "agent.max_review_loops is 0; answers will be returned without review".to_string(),
            );
        }
        if self.agent.approval_threshold > 100 {
            warnings.push(format!(
                "agent.approval_threshold {} exceeds 100; no answer can ever be approved",
                self.agent.approval_threshold
            ));
        }
        if self.retrieval.k == 0 {
            warnings.push("retrieval.k is 0; evidence retrieval will never return hits".to_string());
        }
        if self.provider.kind == "openai" && self.api_key_missing() {
            warnings.push(
                "provider.kind is 'openai' but no api_key is set; the endpoint may reject requests"
                    .to_string(),
            );
        }

        warnings
    }

    fn api_key_missing(&self) -> bool {
        self.provider
            .api_key
            .as_deref()
            .map(|k| k.trim().is_empty())
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let config = FileConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: FileConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.provider.kind, "ollama");
        assert_eq!(parsed.agent.max_review_loops, 3);
        assert_eq!(parsed.retrieval.k, 5);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [provider]
            kind = "openai"
            base_url = "https://api.example.com/v1"
            api_key = "sk-test"
            chat_model = "gpt-4o-mini"

            [agent]
            max_review_loops = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.kind, "openai");
        assert_eq!(config.provider.embed_model, "nomic-embed-text");
        assert_eq!(config.agent.max_review_loops, 5);
        assert_eq!(config.agent.approval_threshold, 75);
        assert!(config.retrieval.grading_enabled);
    }

    #[test]
    fn test_turn_params_projection() {
        let mut config = FileConfig::default();
        config.agent.max_review_loops = 2;
        config.retrieval.grading_enabled = false;

        let params = config.turn_params();
        assert_eq!(params.max_review_loops, 2);
        assert!(!params.grading_enabled);
        assert_eq!(params.approval_threshold, 75);
    }

    #[test]
    fn test_validate_flags_degenerate_values() {
        let mut config = FileConfig::default();
        config.agent.max_review_loops = 0;
        config.retrieval.k = 0;
        config.provider.kind = "openai".to_string();

        let warnings = config.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("max_review_loops")));
        assert!(warnings.iter().any(|w| w.contains("retrieval.k")));
        assert!(warnings.iter().any(|w| w.contains("api_key")));
    }

    #[test]
    fn test_validate_clean_config_has_no_warnings() {
        assert!(FileConfig::default().validate().is_empty());
    }
}
