//! Generate Answer use case.
//!
//! Builds the generation context (system prompt with the tool registry,
//! bounded history, evidence block, question, optional reviewer guidance)
//! and runs the multi-turn tool loop: while the model requests tools and
//! `max_tool_turns` is not exhausted, requests go through [`ToolRunner`]
//! and their outcomes are fed back as a user message. Failed invocations
//! are reported to the model in the same way as successes; the model
//! decides how to proceed with a failure.

use crate::config::TurnParams;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::tool_runner::ToolRunner;
use std::sync::Arc;
use tenderag_domain::{
    AgentPromptTemplate, ConversationHistory, EvidenceFragment, Message, ToolInvocation, truncate,
};
use tracing::{debug, info, warn};

/// A generated answer and the tool invocations made while producing it.
#[derive(Debug, Clone)]
pub struct DraftAnswer {
    pub text: String,
    pub invocations: Vec<ToolInvocation>,
}

/// Use case for generating one answer draft.
pub struct GenerateAnswerUseCase {
    gateway: Arc<dyn LlmGateway>,
    executor: Arc<dyn ToolExecutorPort>,
}

impl GenerateAnswerUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, executor: Arc<dyn ToolExecutorPort>) -> Self {
        Self { gateway, executor }
    }

    /// Generate an answer to `question` against `evidence`.
    ///
    /// For an improvement pass, `prior_answer` is injected as an assistant
    /// turn and `improvement_context` carries the reviewer's guidance; the
    /// question itself stays the primary instruction.
    pub async fn execute(
        &self,
        question: &str,
        history: &ConversationHistory,
        evidence: &[EvidenceFragment],
        prior_answer: Option<&str>,
        improvement_context: Option<&str>,
        params: &TurnParams,
    ) -> Result<DraftAnswer, GatewayError> {
        let tool_spec = self.executor.tool_spec();
        let tools = tool_spec.to_api_tools();

        let mut messages = Vec::new();
        messages.push(Message::system(AgentPromptTemplate::answer_system(tool_spec)));
        messages.extend(history.to_messages());
        if let Some(prior) = prior_answer {
            messages.push(Message::assistant(prior));
        }
        messages.push(Message::user(AgentPromptTemplate::answer(
            question,
            evidence,
            improvement_context,
        )));

        debug!(
            "Generating answer for '{}' with {} evidence fragments",
            truncate(question, 60),
            evidence.len()
        );

        let runner = ToolRunner::new(self.executor.clone(), params.max_tool_retries);
        let mut invocations = Vec::new();
        let mut outcome = self.gateway.chat_complete(&messages, &tools).await?;
        let mut last_text = outcome.text.clone();
        let mut tool_turn = 0u32;

        while outcome.wants_tools() {
            tool_turn += 1;
            if tool_turn > params.max_tool_turns {
                warn!(
                    "Tool loop exceeded max_tool_turns ({}), answering with current text",
                    params.max_tool_turns
                );
                break;
            }

            let requests = std::mem::take(&mut outcome.requested_tool_calls);
            debug!(
                "Tool turn {}/{}: {} requests",
                tool_turn,
                params.max_tool_turns,
                requests.len()
            );

            let mut feedback_sections = Vec::with_capacity(requests.len());
            for request in &requests {
                let invocation = runner.run(request).await;
                feedback_sections.push(format!(
                    "### {}\n{}",
                    invocation.tool_name,
                    invocation.feedback_text()
                ));
                invocations.push(invocation);
            }

            if !outcome.text.is_empty() {
                messages.push(Message::assistant(outcome.text.clone()));
            }
            messages.push(Message::user(format!(
                "## Tool results\n\n{}\n\nContinue answering the question using these results.",
                feedback_sections.join("\n\n")
            )));

            outcome = self.gateway.chat_complete(&messages, &tools).await?;
            if !outcome.text.is_empty() {
                last_text = outcome.text.clone();
            }
        }

        info!(
            "Answer generated after {} tool turn(s), {} invocation(s)",
            tool_turn,
            invocations.len()
        );

        Ok(DraftAnswer {
            text: last_text,
            invocations,
        })
    }
}
