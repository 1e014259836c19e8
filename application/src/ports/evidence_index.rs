//! Evidence index port
//!
//! Defines the interface for semantic search over the embedded notice corpus.

use async_trait::async_trait;
use tenderag_domain::EvidenceFragment;
use thiserror::Error;

/// Errors that can occur during index operations
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Index unavailable: {0}")]
    Unavailable(String),

    #[error("Query vector dimension {got} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Other error: {0}")]
    Other(String),
}

/// One search result: a fragment and its similarity to the query.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub fragment: EvidenceFragment,
    pub score: f32,
}

/// Semantic search over embedded evidence fragments.
///
/// Hits are ordered by descending score; ties keep the index's input order.
/// An empty result is a valid answer, not an error.
#[async_trait]
pub trait EvidenceIndex: Send + Sync {
    async fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError>;
}
