//! Domain layer for tenderag
//!
//! This crate contains the core business logic, entities, and value objects
//! for answering questions about procurement notices. It has no dependencies
//! on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Turn
//!
//! One user question processed end to end: route → retrieve → answer →
//! review loop → [`AgentResult`]. All entities created during a turn are
//! immutable once built and discarded when the turn ends; only the
//! `AgentResult` crosses into persistence.
//!
//! ## Review Loop
//!
//! One iteration of answer-then-critique. The reviewer emits a semi-structured
//! text verdict that [`parse_review_verdict`] turns into a typed
//! [`ReviewVerdict`] — or a designated "unparseable" `None`, never a partial
//! object.

pub mod conversation;
pub mod core;
pub mod evidence;
pub mod prompt;
pub mod review;
pub mod route;
pub mod tool;
pub mod turn;
pub mod util;

// Re-export commonly used types
pub use conversation::{ConversationHistory, Message, Role, Utterance};
pub use core::error::DomainError;
pub use evidence::{AttributeValue, EvidenceFragment};
pub use prompt::AgentPromptTemplate;
pub use review::{
    parsing::parse_review_verdict,
    verdict::{ParamValidation, ReviewStatus, ReviewVerdict, ToolSuggestion},
};
pub use route::{Route, parse_route_label};
pub use tool::{
    entities::{ToolDefinition, ToolParameter, ToolRequest, ToolSpec},
    value_objects::{
        InvocationOutcome, ToolAttempt, ToolError, ToolInvocation, ToolResult,
    },
};
pub use turn::{AgentResult, DocumentRef, ReviewLoopRecord, ReviewTracking};
pub use util::truncate;
