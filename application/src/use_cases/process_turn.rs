//! Process Turn use case — the orchestration state machine.
//!
//! One user question runs through `INITIAL_ANSWER → REVIEW → {IMPROVE →
//! REVIEW}* → DONE`. The controller owns the loop counter and score
//! accumulation exclusively; sub-use-cases never count loops.
//!
//! Loop accounting: a review loop is one answer-then-critique iteration,
//! so the mandatory initial review is loop 1 and
//! `all_scores.len() == loops_executed` holds at every exit. The loop ends
//! on effective approval or when `loops_executed` reaches the hard ceiling.
//!
//! Failure policy: once any answer exists, gateway failures fail closed.
//! A failed review or improvement call logs the anomaly and returns the
//! best answer so far, with `review_tracking.performed == false` when no
//! review ever completed and a partial history otherwise. The only
//! fallible path out is a failure before the first draft exists.

use crate::config::TurnParams;
use crate::ports::evidence_index::EvidenceIndex;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::generate_answer::GenerateAnswerUseCase;
use crate::use_cases::retrieve_evidence::RetrieveEvidenceUseCase;
use crate::use_cases::review_response::ReviewResponseUseCase;
use crate::use_cases::route_question::RouteQuestionUseCase;
use std::sync::Arc;
use tenderag_domain::{
    AgentPromptTemplate, AgentResult, ConversationHistory, DocumentRef, DomainError,
    ReviewLoopRecord, ReviewTracking, ToolInvocation, truncate,
};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while processing a turn.
///
/// Only failures before any answer exists surface here; everything later
/// fails closed into the returned [`AgentResult`].
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Input for the [`ProcessTurnUseCase`].
#[derive(Debug, Clone)]
pub struct ProcessTurnInput {
    /// The user's question
    pub question: String,
    /// Prior conversation, already bounded by the history cap
    pub history: ConversationHistory,
    /// Parameters for this turn
    pub params: TurnParams,
}

impl ProcessTurnInput {
    pub fn new(question: impl Into<String>, history: ConversationHistory, params: TurnParams) -> Self {
        Self {
            question: question.into(),
            history,
            params,
        }
    }
}

/// Sole entry point for answering one user question.
pub struct ProcessTurnUseCase {
    route: RouteQuestionUseCase,
    retrieve: RetrieveEvidenceUseCase,
    generate: GenerateAnswerUseCase,
    review: ReviewResponseUseCase,
    executor: Arc<dyn ToolExecutorPort>,
}

impl ProcessTurnUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        index: Arc<dyn EvidenceIndex>,
        executor: Arc<dyn ToolExecutorPort>,
    ) -> Self {
        Self {
            route: RouteQuestionUseCase::new(gateway.clone()),
            retrieve: RetrieveEvidenceUseCase::new(gateway.clone(), index),
            generate: GenerateAnswerUseCase::new(gateway.clone(), executor.clone()),
            review: ReviewResponseUseCase::new(gateway),
            executor,
        }
    }

    /// Process one turn end to end.
    pub async fn execute(&self, input: ProcessTurnInput) -> Result<AgentResult, TurnError> {
        let ProcessTurnInput {
            question,
            history,
            params,
        } = input;

        if question.trim().is_empty() {
            return Err(DomainError::InvalidQuestion("question is empty".to_string()).into());
        }

        info!("Processing turn: {}", truncate(&question, 100));

        // Stage 1: route
        let route = self.route.execute(&question).await;

        // Stage 2: retrieve (evidence route only). A failing retrieval
        // degrades to empty evidence; the answer then discloses the gap.
        let evidence = if route.needs_evidence() {
            match self.retrieve.execute(&question, &params).await {
                Ok(fragments) => fragments,
                Err(e) => {
                    warn!("Retrieval failed, answering without evidence: {e}");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        // Stage 3: initial answer. Without any draft there is nothing to
        // fail closed to.
        let initial = self
            .generate
            .execute(&question, &history, &evidence, None, None, &params)
            .await?;

        let initial_answer = initial.text.clone();
        let mut current_answer = initial.text;
        let mut tools_used: Vec<String> = Vec::new();
        push_tool_names(&mut tools_used, &initial.invocations);
        let mut pending_invocations = initial.invocations;

        // Stage 4: review loop
        let mut loops_executed = 0u32;
        let mut all_scores: Vec<u8> = Vec::new();
        let mut loop_history: Vec<ReviewLoopRecord> = Vec::new();

        loop {
            let verdict = match self
                .review
                .execute(
                    &question,
                    &history,
                    &current_answer,
                    &evidence,
                    &tools_used,
                    self.executor.tool_spec(),
                    params.approval_threshold,
                )
                .await
            {
                Ok(verdict) => verdict,
                Err(e) => {
                    warn!("Review call failed, returning best answer so far: {e}");
                    break;
                }
            };

            loops_executed += 1;
            all_scores.push(verdict.score);
            let approved = verdict.is_effectively_approved(params.approval_threshold);
            loop_history.push(ReviewLoopRecord {
                loop_index: loops_executed,
                verdict: verdict.clone(),
                answer_snapshot: current_answer.clone(),
                tool_calls_this_loop: std::mem::take(&mut pending_invocations),
            });

            if approved {
                info!(
                    "Answer approved on loop {} with score {}",
                    loops_executed, verdict.score
                );
                break;
            }
            if loops_executed >= params.max_review_loops {
                warn!(
                    "Review loop ceiling reached ({}), returning last answer with score {}",
                    params.max_review_loops, verdict.score
                );
                break;
            }

            let guidance = AgentPromptTemplate::improvement_context(&current_answer, &verdict);
            match self
                .generate
                .execute(
                    &question,
                    &history,
                    &evidence,
                    Some(&current_answer),
                    Some(&guidance),
                    &params,
                )
                .await
            {
                Ok(draft) => {
                    push_tool_names(&mut tools_used, &draft.invocations);
                    pending_invocations = draft.invocations;
                    current_answer = draft.text;
                }
                Err(e) => {
                    warn!("Improvement call failed, returning best answer so far: {e}");
                    break;
                }
            }
        }

        let improvement_applied = loops_executed > 1 && current_answer != initial_answer;
        let final_score = all_scores.last().copied().unwrap_or(0);
        let review_tracking = ReviewTracking {
            performed: loops_executed > 0,
            max_loops: params.max_review_loops,
            loops_executed,
            improvement_applied,
            all_scores,
            final_score,
            history: loop_history,
        };

        Ok(AgentResult {
            final_answer: current_answer,
            documents_used: evidence.iter().map(DocumentRef::from_fragment).collect(),
            tools_used,
            route,
            review_tracking,
        })
    }
}

/// Append tool names in invocation order, without duplicates.
fn push_tool_names(tools_used: &mut Vec<String>, invocations: &[ToolInvocation]) {
    for invocation in invocations {
        if !tools_used.iter().any(|t| t == &invocation.tool_name) {
            tools_used.push(invocation.tool_name.clone());
        }
    }
}
