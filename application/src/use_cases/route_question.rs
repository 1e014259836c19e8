//! Route Question use case.
//!
//! One gateway call classifying the current utterance as needing evidence
//! or not. History is never included: the classifier must not drift based
//! on earlier, unrelated turns. No retries — any failure (gateway or
//! unparseable label) recovers locally to the conversational route, which
//! is always safe to answer.

use crate::ports::llm_gateway::LlmGateway;
use std::sync::Arc;
use tenderag_domain::{AgentPromptTemplate, Message, Route, parse_route_label, truncate};
use tracing::{debug, warn};

/// Use case for classifying a turn's route.
pub struct RouteQuestionUseCase {
    gateway: Arc<dyn LlmGateway>,
}

impl RouteQuestionUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }

    /// Classify the utterance. Infallible by construction: failures default
    /// to [`Route::Conversational`] with a logged anomaly.
    pub async fn execute(&self, utterance: &str) -> Route {
        let prompt = AgentPromptTemplate::router(utterance);
        let messages = vec![Message::user(prompt)];

        let response = match self.gateway.chat_complete(&messages, &[]).await {
            Ok(outcome) => outcome.text,
            Err(e) => {
                warn!("Router gateway call failed, defaulting to conversational: {e}");
                return Route::Conversational;
            }
        };

        match parse_route_label(&response) {
            Some(route) => {
                debug!("Routed '{}' as {}", truncate(utterance, 60), route);
                route
            }
            None => {
                warn!(
                    "Router produced an unrecognized label ({}), defaulting to conversational",
                    truncate(&response, 80)
                );
                Route::Conversational
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::{ChatOutcome, GatewayError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // ==================== Test Mocks ====================

    struct ScriptedGateway {
        responses: Mutex<VecDeque<Result<ChatOutcome, GatewayError>>>,
        sent: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedGateway {
        fn new(responses: Vec<Result<ChatOutcome, GatewayError>>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from(responses)),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn chat_complete(
            &self,
            messages: &[Message],
            _tools: &[serde_json::Value],
        ) -> Result<ChatOutcome, GatewayError> {
            self.sent.lock().unwrap().push(messages.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Other("No more responses".to_string())))
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, GatewayError> {
            Ok(vec![0.0])
        }
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_evidence_label_routes_to_evidence() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(ChatOutcome::text("EVIDENCE"))]));
        let use_case = RouteQuestionUseCase::new(gateway);

        let route = use_case.execute("What is the budget of notice N-1?").await;
        assert_eq!(route, Route::Evidence);
    }

    #[tokio::test]
    async fn test_chat_label_routes_to_conversational() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(ChatOutcome::text("CHAT"))]));
        let use_case = RouteQuestionUseCase::new(gateway);

        let route = use_case.execute("thanks, that helps!").await;
        assert_eq!(route, Route::Conversational);
    }

    #[tokio::test]
    async fn test_unrecognized_label_defaults_to_conversational() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(ChatOutcome::text(
            "I believe this needs documents",
        ))]));
        let use_case = RouteQuestionUseCase::new(gateway);

        let route = use_case.execute("anything").await;
        assert_eq!(route, Route::Conversational);
    }

    #[tokio::test]
    async fn test_gateway_error_defaults_to_conversational() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Err(GatewayError::Timeout)]));
        let use_case = RouteQuestionUseCase::new(gateway);

        let route = use_case.execute("anything").await;
        assert_eq!(route, Route::Conversational);
    }

    #[tokio::test]
    async fn test_router_sees_only_the_current_utterance() {
        // Same utterance must produce the same classifier input regardless
        // of surrounding conversation, so the prompt contains exactly one
        // user message built from the utterance alone.
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(ChatOutcome::text("EVIDENCE"))]));
        let use_case = RouteQuestionUseCase::new(gateway.clone());

        use_case.execute("What is the deadline?").await;

        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].len(), 1);
        assert!(sent[0][0].content.contains("What is the deadline?"));
        assert!(!sent[0][0].content.contains("previous"));
    }
}
