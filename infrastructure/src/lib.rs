//! Infrastructure layer for tenderag
//!
//! Concrete adapters for the application layer's ports: provider gateways,
//! the in-memory evidence index, the notice catalog client and its tool
//! executor, configuration loading, and JSONL turn persistence.

pub mod catalog;
pub mod config;
pub mod index;
pub mod logging;
pub mod providers;
pub mod tools;

// Re-export commonly used types
pub use catalog::NoticeCatalogClient;
pub use config::{ConfigLoader, FileConfig};
pub use index::InMemoryEvidenceIndex;
pub use logging::JsonlTurnStore;
pub use providers::{OllamaGateway, OpenAiGateway, ProviderKind, build_gateway};
pub use tools::CatalogToolExecutor;
