//! Review Response use case.
//!
//! One gateway call judging a candidate answer: the reviewer sees the
//! question, a digest of the conversation, the draft, the evidence and
//! tools the draft actually used, and the shared tool schema list. The
//! response is parsed into a [`ReviewVerdict`]; output that does not
//! follow the verdict grammar becomes the forced NEEDS_IMPROVEMENT
//! sentinel rather than a silent approval.

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use std::sync::Arc;
use tenderag_domain::{
    AgentPromptTemplate, ConversationHistory, EvidenceFragment, Message, ReviewVerdict, ToolSpec,
    parse_review_verdict, truncate,
};
use tracing::{debug, warn};

/// Use case for reviewing one answer draft.
pub struct ReviewResponseUseCase {
    gateway: Arc<dyn LlmGateway>,
}

impl ReviewResponseUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }

    /// Review `candidate_answer`. Gateway failures propagate (the caller
    /// decides how to fail closed); unparseable reviewer output does not.
    #[allow(clippy::too_many_arguments)]
    pub async fn execute(
        &self,
        question: &str,
        history: &ConversationHistory,
        candidate_answer: &str,
        evidence: &[EvidenceFragment],
        tools_used: &[String],
        available_tools: &ToolSpec,
        approval_threshold: u8,
    ) -> Result<ReviewVerdict, GatewayError> {
        let prompt = AgentPromptTemplate::review(
            question,
            &history_digest(history),
            candidate_answer,
            evidence,
            tools_used,
            available_tools,
            approval_threshold,
        );
        let messages = vec![Message::user(prompt)];

        let outcome = self.gateway.chat_complete(&messages, &[]).await?;

        match parse_review_verdict(&outcome.text) {
            Some(verdict) => {
                debug!(
                    "Review verdict: {} (score {})",
                    verdict.status, verdict.score
                );
                Ok(verdict)
            }
            None => {
                warn!(
                    "Reviewer output could not be parsed ({}), forcing NEEDS_IMPROVEMENT",
                    truncate(&outcome.text, 120)
                );
                Ok(ReviewVerdict::unparseable())
            }
        }
    }
}

/// Compact one-line-per-utterance rendering for the reviewer's context.
fn history_digest(history: &ConversationHistory) -> String {
    history
        .utterances()
        .iter()
        .map(|u| format!("{}: {}", u.role.as_str(), truncate(&u.text, 200)))
        .collect::<Vec<_>>()
        .join("\n")
}
