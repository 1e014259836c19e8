//! Review verdict value objects

use serde::{Deserialize, Serialize};

/// Status self-reported by the reviewing model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Approved,
    NeedsImprovement,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ReviewStatus::Approved => "APPROVED",
            ReviewStatus::NeedsImprovement => "NEEDS_IMPROVEMENT",
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tool the reviewer suggests the next attempt should call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSuggestion {
    pub tool: String,
    pub params: String,
    pub reason: String,
}

/// A parameter problem the reviewer found in an executed tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamValidation {
    pub tool: String,
    pub param: String,
    pub issue: String,
    pub suggested_value: String,
}

/// Structured verdict emitted by the response reviewer.
///
/// The reviewer is contractually required to keep `status` and `score`
/// consistent with the approval threshold; the controller does not trust
/// that and recomputes approval via [`Self::is_effectively_approved`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewVerdict {
    pub status: ReviewStatus,
    /// 0–100
    pub score: u8,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub tool_suggestions: Vec<ToolSuggestion>,
    pub param_validation: Vec<ParamValidation>,
    pub feedback: String,
}

impl ReviewVerdict {
    /// Defensive approval check: both the self-reported status and the score
    /// must clear the threshold. An inconsistent pair (e.g. `APPROVED` with a
    /// failing score) is treated as NEEDS_IMPROVEMENT.
    pub fn is_effectively_approved(&self, approval_threshold: u8) -> bool {
        self.status == ReviewStatus::Approved && self.score >= approval_threshold
    }

    /// Sentinel verdict used when reviewer output could not be parsed.
    ///
    /// Forces NEEDS_IMPROVEMENT with the minimum score — erring toward more
    /// review iterations is always safer than defaulting to approval.
    pub fn unparseable() -> Self {
        Self {
            status: ReviewStatus::NeedsImprovement,
            score: 0,
            issues: vec!["Reviewer output could not be parsed".to_string()],
            suggestions: Vec::new(),
            tool_suggestions: Vec::new(),
            param_validation: Vec::new(),
            feedback: "The review response did not follow the expected format; \
                       treating the draft as needing improvement."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(status: ReviewStatus, score: u8) -> ReviewVerdict {
        ReviewVerdict {
            status,
            score,
            issues: Vec::new(),
            suggestions: Vec::new(),
            tool_suggestions: Vec::new(),
            param_validation: Vec::new(),
            feedback: String::new(),
        }
    }

    #[test]
    fn test_consistent_approval() {
        assert!(verdict(ReviewStatus::Approved, 80).is_effectively_approved(75));
    }

    #[test]
    fn test_inconsistent_approved_below_threshold_is_rejected() {
        // STATUS: APPROVED, SCORE: 60 with threshold 75 must not pass
        assert!(!verdict(ReviewStatus::Approved, 60).is_effectively_approved(75));
    }

    #[test]
    fn test_high_score_with_needs_improvement_is_rejected() {
        assert!(!verdict(ReviewStatus::NeedsImprovement, 90).is_effectively_approved(75));
    }

    #[test]
    fn test_unparseable_sentinel_never_approves() {
        let sentinel = ReviewVerdict::unparseable();
        assert_eq!(sentinel.status, ReviewStatus::NeedsImprovement);
        assert_eq!(sentinel.score, 0);
        assert!(!sentinel.is_effectively_approved(0));
        assert!(!sentinel.is_effectively_approved(75));
    }
}
