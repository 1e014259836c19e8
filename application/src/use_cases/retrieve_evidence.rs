//! Retrieve Evidence use case.
//!
//! Embeds the question, searches the evidence index and optionally grades
//! each hit for relevance with a YES/NO gateway call.
//!
//! Grading is advisory and must never leave the generator with nothing to
//! work with when the corpus did match: if grading rejects every fragment
//! of a non-empty retrieval, the search is retried once with a broadened
//! query, and if grading empties that pass too, the single top-ranked
//! fragment of the second pass is kept. Only a retrieval that finds zero
//! hits produces empty evidence.

use crate::config::TurnParams;
use crate::ports::evidence_index::{EvidenceIndex, IndexError};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use std::sync::Arc;
use tenderag_domain::{AgentPromptTemplate, EvidenceFragment, Message, truncate};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during evidence retrieval.
#[derive(Error, Debug)]
pub enum RetrieveError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),
}

/// Use case for retrieving and grading evidence for a question.
pub struct RetrieveEvidenceUseCase {
    gateway: Arc<dyn LlmGateway>,
    index: Arc<dyn EvidenceIndex>,
}

impl RetrieveEvidenceUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, index: Arc<dyn EvidenceIndex>) -> Self {
        Self { gateway, index }
    }

    /// Retrieve evidence for `question`. An empty result means the corpus
    /// has nothing relevant; it is a valid outcome, not an error.
    pub async fn execute(
        &self,
        question: &str,
        params: &TurnParams,
    ) -> Result<Vec<EvidenceFragment>, RetrieveError> {
        let fragments = self.fetch(question, params.retrieval_k).await?;

        if fragments.is_empty() {
            info!("Retrieval found no fragments for '{}'", truncate(question, 60));
            return Ok(Vec::new());
        }

        if !params.grading_enabled {
            return Ok(fragments);
        }

        let graded = self.grade(question, fragments).await;
        if !graded.is_empty() {
            return Ok(graded);
        }

        // Grading rejected everything the first pass found. Broaden the
        // query and try once more before giving up on retrieved evidence.
        let broadened = broadened_query(question);
        warn!(
            "Grading rejected all fragments, retrying retrieval with broadened query '{}'",
            truncate(&broadened, 80)
        );
        let second_pass = self.fetch(&broadened, params.retrieval_k).await?;
        if second_pass.is_empty() {
            return Ok(Vec::new());
        }

        let top_ranked = second_pass[0].clone();
        let graded = self.grade(question, second_pass).await;
        if graded.is_empty() {
            // Keep the best match rather than answering blind.
            debug!(
                "Grading rejected the second pass too, keeping top-ranked fragment {}",
                top_ranked.id
            );
            Ok(vec![top_ranked])
        } else {
            Ok(graded)
        }
    }

    /// Embed the query and search the index, carrying each hit's score
    /// into the fragment.
    async fn fetch(&self, query: &str, k: usize) -> Result<Vec<EvidenceFragment>, RetrieveError> {
        let embedding = self.gateway.embed(query).await?;
        let hits = self.index.search(&embedding, k).await?;

        debug!("Index returned {} hits for '{}'", hits.len(), truncate(query, 60));

        Ok(hits
            .into_iter()
            .map(|hit| {
                let mut fragment = hit.fragment;
                fragment.similarity_score = hit.score;
                fragment
            })
            .collect())
    }

    /// Grade each fragment with a YES/NO gateway call, keeping those the
    /// grader accepts. An ambiguous label or a failed grading call keeps
    /// the fragment; discarding evidence needs a clear NO.
    async fn grade(
        &self,
        question: &str,
        fragments: Vec<EvidenceFragment>,
    ) -> Vec<EvidenceFragment> {
        let mut kept = Vec::with_capacity(fragments.len());

        for fragment in fragments {
            let prompt = AgentPromptTemplate::grade_fragment(question, &fragment);
            let messages = vec![Message::user(prompt)];

            match self.gateway.chat_complete(&messages, &[]).await {
                Ok(outcome) => {
                    if is_clear_rejection(&outcome.text) {
                        debug!("Grader rejected fragment {}", fragment.id);
                    } else {
                        kept.push(fragment);
                    }
                }
                Err(e) => {
                    warn!("Grading call failed, keeping fragment {}: {e}", fragment.id);
                    kept.push(fragment);
                }
            }
        }

        kept
    }
}

/// A fragment is dropped only on an unambiguous NO.
fn is_clear_rejection(label: &str) -> bool {
    let upper = label.to_uppercase();
    upper.contains("NO") && !upper.contains("YES")
}

/// Second-pass query used when grading empties the first retrieval.
fn broadened_query(question: &str) -> String {
    format!(
        "{} procurement notice details",
        question.trim().trim_end_matches(['?', '.', '!'])
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::evidence_index::SearchHit;
    use crate::ports::llm_gateway::ChatOutcome;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // ==================== Test Mocks ====================

    struct ScriptedGateway {
        responses: Mutex<VecDeque<Result<ChatOutcome, GatewayError>>>,
    }

    impl ScriptedGateway {
        fn new(responses: Vec<Result<ChatOutcome, GatewayError>>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from(responses)),
            }
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn chat_complete(
            &self,
            _messages: &[Message],
            _tools: &[serde_json::Value],
        ) -> Result<ChatOutcome, GatewayError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Other("No more responses".to_string())))
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, GatewayError> {
            Ok(vec![1.0, 0.0])
        }
    }

    struct ScriptedIndex {
        results: Mutex<VecDeque<Vec<SearchHit>>>,
    }

    impl ScriptedIndex {
        fn new(results: Vec<Vec<SearchHit>>) -> Self {
            Self {
                results: Mutex::new(VecDeque::from(results)),
            }
        }
    }

    #[async_trait]
    impl EvidenceIndex for ScriptedIndex {
        async fn search(
            &self,
            _query_vector: &[f32],
            _k: usize,
        ) -> Result<Vec<SearchHit>, IndexError> {
            Ok(self.results.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    fn hit(id: &str, score: f32) -> SearchHit {
        SearchHit {
            fragment: EvidenceFragment::new(id, "notice-1", "Budget", format!("text of {id}"), 0.0),
            score,
        }
    }

    fn params() -> TurnParams {
        TurnParams::default()
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_zero_hits_yield_empty_evidence() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let index = Arc::new(ScriptedIndex::new(vec![vec![]]));
        let use_case = RetrieveEvidenceUseCase::new(gateway, index);

        let evidence = use_case.execute("obscure question", &params()).await.unwrap();
        assert!(evidence.is_empty());
    }

    #[tokio::test]
    async fn test_grading_keeps_accepted_fragments() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Ok(ChatOutcome::text("YES")),
            Ok(ChatOutcome::text("NO")),
            Ok(ChatOutcome::text("YES")),
        ]));
        let index = Arc::new(ScriptedIndex::new(vec![vec![
            hit("f1", 0.9),
            hit("f2", 0.8),
            hit("f3", 0.7),
        ]]));
        let use_case = RetrieveEvidenceUseCase::new(gateway, index);

        let evidence = use_case.execute("budget?", &params()).await.unwrap();
        let ids: Vec<&str> = evidence.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f3"]);
        assert_eq!(evidence[0].similarity_score, 0.9);
    }

    #[tokio::test]
    async fn test_grading_disabled_returns_all_hits() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let index = Arc::new(ScriptedIndex::new(vec![vec![hit("f1", 0.9), hit("f2", 0.8)]]));
        let use_case = RetrieveEvidenceUseCase::new(gateway, index);

        let evidence = use_case
            .execute("budget?", &params().with_grading(false))
            .await
            .unwrap();
        assert_eq!(evidence.len(), 2);
    }

    #[tokio::test]
    async fn test_ambiguous_grade_keeps_fragment() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(ChatOutcome::text(
            "It could be relevant, yes or no is hard to say",
        ))]));
        let index = Arc::new(ScriptedIndex::new(vec![vec![hit("f1", 0.9)]]));
        let use_case = RetrieveEvidenceUseCase::new(gateway, index);

        let evidence = use_case.execute("budget?", &params()).await.unwrap();
        assert_eq!(evidence.len(), 1);
    }

    #[tokio::test]
    async fn test_grading_failure_keeps_fragment() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Err(GatewayError::Timeout)]));
        let index = Arc::new(ScriptedIndex::new(vec![vec![hit("f1", 0.9)]]));
        let use_case = RetrieveEvidenceUseCase::new(gateway, index);

        let evidence = use_case.execute("budget?", &params()).await.unwrap();
        assert_eq!(evidence.len(), 1);
    }

    #[tokio::test]
    async fn test_emptied_grading_retries_then_keeps_top_ranked() {
        // First pass: 2 fragments, both rejected. Second pass (broadened
        // query): 2 fragments, both rejected again. The top-ranked fragment
        // of the second pass must survive.
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Ok(ChatOutcome::text("NO")),
            Ok(ChatOutcome::text("NO")),
            Ok(ChatOutcome::text("NO")),
            Ok(ChatOutcome::text("NO")),
        ]));
        let index = Arc::new(ScriptedIndex::new(vec![
            vec![hit("f1", 0.9), hit("f2", 0.8)],
            vec![hit("g1", 0.6), hit("g2", 0.5)],
        ]));
        let use_case = RetrieveEvidenceUseCase::new(gateway, index);

        let evidence = use_case.execute("budget?", &params()).await.unwrap();
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].id, "g1");
    }

    #[tokio::test]
    async fn test_emptied_grading_retry_can_succeed() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Ok(ChatOutcome::text("NO")),
            Ok(ChatOutcome::text("YES")),
        ]));
        let index = Arc::new(ScriptedIndex::new(vec![
            vec![hit("f1", 0.9)],
            vec![hit("g1", 0.6)],
        ]));
        let use_case = RetrieveEvidenceUseCase::new(gateway, index);

        let evidence = use_case.execute("budget?", &params()).await.unwrap();
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].id, "g1");
    }

    #[tokio::test]
    async fn test_emptied_grading_with_empty_second_pass_yields_empty() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(ChatOutcome::text("NO"))]));
        let index = Arc::new(ScriptedIndex::new(vec![vec![hit("f1", 0.9)], vec![]]));
        let use_case = RetrieveEvidenceUseCase::new(gateway, index);

        let evidence = use_case.execute("budget?", &params()).await.unwrap();
        assert!(evidence.is_empty());
    }

    #[test]
    fn test_broadened_query_strips_trailing_punctuation() {
        assert_eq!(
            broadened_query("What is the budget?"),
            "What is the budget procurement notice details"
        );
    }
}
