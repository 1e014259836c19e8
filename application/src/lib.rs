//! Application layer for tenderag
//!
//! This crate contains use cases, port definitions, and application
//! configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::TurnParams;
pub use ports::{
    evidence_index::{EvidenceIndex, IndexError, SearchHit},
    llm_gateway::{ChatOutcome, GatewayError, LlmGateway},
    tool_executor::ToolExecutorPort,
    turn_store::{NoTurnStore, TurnRecord, TurnStore},
};
pub use use_cases::process_turn::{ProcessTurnInput, ProcessTurnUseCase, TurnError};
