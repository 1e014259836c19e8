//! Turn result entities
//!
//! [`AgentResult`] is the terminal artifact of one processed turn and the
//! only object that crosses into the persistence layer. Its JSON shape is a
//! UI contract: downstream panels are keyed on the exact field names
//! `documents_used`, `tools_used`, `review_tracking`, `all_scores` and
//! `final_score`. Renaming any of these breaks rendering.

use crate::evidence::EvidenceFragment;
use crate::review::verdict::ReviewVerdict;
use crate::route::Route;
use crate::tool::value_objects::ToolInvocation;
use serde::{Deserialize, Serialize};

/// One review loop: the verdict, the answer it judged, and the tool calls
/// made while producing that answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewLoopRecord {
    /// 1-based loop index (the mandatory initial review is loop 1)
    pub loop_index: u32,
    pub verdict: ReviewVerdict,
    pub answer_snapshot: String,
    pub tool_calls_this_loop: Vec<ToolInvocation>,
}

/// Audit trail of the improvement loop for one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewTracking {
    /// False when the gateway failed before any review completed
    pub performed: bool,
    pub max_loops: u32,
    /// Number of review loops executed (answer-then-critique iterations)
    pub loops_executed: u32,
    /// True when at least one improvement cycle ran and changed the answer
    pub improvement_applied: bool,
    /// Score of each review, in loop order; `len == loops_executed`
    pub all_scores: Vec<u8>,
    /// Score of the last review, 0 when no review completed
    pub final_score: u8,
    pub history: Vec<ReviewLoopRecord>,
}

impl ReviewTracking {
    /// Tracking for a turn where review never ran (gateway failure).
    pub fn not_performed(max_loops: u32) -> Self {
        Self {
            performed: false,
            max_loops,
            loops_executed: 0,
            improvement_applied: false,
            all_scores: Vec::new(),
            final_score: 0,
            history: Vec::new(),
        }
    }
}

/// Reference to an evidence fragment used by the final answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub summary: String,
}

impl DocumentRef {
    pub fn from_fragment(fragment: &EvidenceFragment) -> Self {
        Self {
            id: fragment.id.clone(),
            summary: fragment.summary(),
        }
    }
}

/// Terminal artifact of one processed turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub final_answer: String,
    pub documents_used: Vec<DocumentRef>,
    pub tools_used: Vec<String>,
    pub route: Route,
    pub review_tracking: ReviewTracking,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::verdict::ReviewStatus;

    fn sample_result() -> AgentResult {
        AgentResult {
            final_answer: "The budget is 1.2M EUR.".to_string(),
            documents_used: vec![DocumentRef {
                id: "frag-1".to_string(),
                summary: "notice-42 (Budget): Total: 1.2M EUR".to_string(),
            }],
            tools_used: vec!["get_notice_details".to_string()],
            route: Route::Evidence,
            review_tracking: ReviewTracking {
                performed: true,
                max_loops: 3,
                loops_executed: 2,
                improvement_applied: true,
                all_scores: vec![60, 85],
                final_score: 85,
                history: vec![
                    ReviewLoopRecord {
                        loop_index: 1,
                        verdict: ReviewVerdict {
                            status: ReviewStatus::NeedsImprovement,
                            score: 60,
                            issues: vec!["missing source".to_string()],
                            suggestions: Vec::new(),
                            tool_suggestions: Vec::new(),
                            param_validation: Vec::new(),
                            feedback: String::new(),
                        },
                        answer_snapshot: "draft".to_string(),
                        tool_calls_this_loop: Vec::new(),
                    },
                    ReviewLoopRecord {
                        loop_index: 2,
                        verdict: ReviewVerdict {
                            status: ReviewStatus::Approved,
                            score: 85,
                            issues: Vec::new(),
                            suggestions: Vec::new(),
                            tool_suggestions: Vec::new(),
                            param_validation: Vec::new(),
                            feedback: String::new(),
                        },
                        answer_snapshot: "final".to_string(),
                        tool_calls_this_loop: Vec::new(),
                    },
                ],
            },
        }
    }

    #[test]
    fn test_json_field_names_are_stable() {
        // Downstream UI panels are keyed on these exact names.
        let json = serde_json::to_value(sample_result()).unwrap();
        assert!(json.get("documents_used").is_some());
        assert!(json.get("tools_used").is_some());
        let tracking = json.get("review_tracking").expect("review_tracking");
        assert!(tracking.get("all_scores").is_some());
        assert!(tracking.get("final_score").is_some());
        assert_eq!(tracking["loops_executed"], 2);
    }

    #[test]
    fn test_scores_match_loops() {
        let result = sample_result();
        assert_eq!(
            result.review_tracking.all_scores.len(),
            result.review_tracking.loops_executed as usize
        );
        assert_eq!(
            result.review_tracking.final_score,
            *result.review_tracking.all_scores.last().unwrap()
        );
    }

    #[test]
    fn test_not_performed_tracking() {
        let tracking = ReviewTracking::not_performed(3);
        assert!(!tracking.performed);
        assert_eq!(tracking.loops_executed, 0);
        assert!(tracking.all_scores.is_empty());
        assert!(tracking.history.is_empty());
    }
}
