//! Port definitions (interfaces) for the application layer
//!
//! Ports define how the application layer communicates with the outside
//! world. Adapters in the infrastructure layer implement them.

pub mod evidence_index;
pub mod llm_gateway;
pub mod tool_executor;
pub mod turn_store;

pub use evidence_index::{EvidenceIndex, IndexError, SearchHit};
pub use llm_gateway::{ChatOutcome, GatewayError, LlmGateway};
pub use tool_executor::ToolExecutorPort;
pub use turn_store::{NoTurnStore, TurnRecord, TurnStore};
