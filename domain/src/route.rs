//! Route classification
//!
//! The router decides, from the current utterance alone, whether a turn
//! needs retrieved evidence. The model answers with one of two labels;
//! anything else is a classification failure the caller recovers from
//! locally by defaulting to the conversational route.

use serde::{Deserialize, Serialize};

/// The binary decision of whether a turn needs retrieved evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Question about the notice corpus — retrieve evidence first
    Evidence,
    /// General conversation — answer directly
    Conversational,
}

impl Route {
    pub fn needs_evidence(&self) -> bool {
        matches!(self, Route::Evidence)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Route::Evidence => "evidence",
            Route::Conversational => "conversational",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse the router's constrained two-label output.
///
/// Accepts `EVIDENCE` or `CHAT` (case-insensitive, surrounding prose
/// tolerated as long as exactly one label appears). Ambiguous or alien
/// output returns `None` — a classification failure, not an error.
pub fn parse_route_label(response: &str) -> Option<Route> {
    let upper = response.to_uppercase();
    let has_evidence = upper.contains("EVIDENCE");
    let has_chat = upper.contains("CHAT");

    match (has_evidence, has_chat) {
        (true, false) => Some(Route::Evidence),
        (false, true) => Some(Route::Conversational),
        _ => None,
    }
}
