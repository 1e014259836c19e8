//! Application-level configuration.
//!
//! [`TurnParams`] bundles the knobs that control how a single turn runs:
//! the review loop ceiling, the approval threshold, tool-loop bounds and
//! retrieval depth. Use cases receive it by reference; nothing here is
//! mutated during a turn.

/// Parameters governing one processed turn.
#[derive(Debug, Clone)]
pub struct TurnParams {
    /// Hard ceiling on review loops (answer-then-critique iterations).
    /// The mandatory initial review counts as loop 1.
    pub max_review_loops: u32,
    /// Minimum score (0-100) for a verdict to count as approval
    pub approval_threshold: u8,
    /// Maximum tool turns within one answer generation
    pub max_tool_turns: u32,
    /// Retries after the first failed tool attempt (transient errors only)
    pub max_tool_retries: u32,
    /// Number of fragments requested from the evidence index
    pub retrieval_k: usize,
    /// Whether retrieved fragments are relevance-graded before use
    pub grading_enabled: bool,
    /// Maximum utterances of conversation history read into a turn
    pub history_cap: usize,
}

impl Default for TurnParams {
    fn default() -> Self {
        Self {
            max_review_loops: 3,
            approval_threshold: 75,
            max_tool_turns: 3,
            max_tool_retries: 2,
            retrieval_k: 5,
            grading_enabled: true,
            history_cap: 20,
        }
    }
}

impl TurnParams {
    pub fn with_max_review_loops(mut self, max: u32) -> Self {
        self.max_review_loops = max;
        self
    }

    pub fn with_approval_threshold(mut self, threshold: u8) -> Self {
        self.approval_threshold = threshold;
        self
    }

    pub fn with_max_tool_turns(mut self, max: u32) -> Self {
        self.max_tool_turns = max;
        self
    }

    pub fn with_max_tool_retries(mut self, max: u32) -> Self {
        self.max_tool_retries = max;
        self
    }

    pub fn with_retrieval_k(mut self, k: usize) -> Self {
        self.retrieval_k = k;
        self
    }

    pub fn with_grading(mut self, enabled: bool) -> Self {
        self.grading_enabled = enabled;
        self
    }
}
