//! In-memory vector index over embedded notice fragments.
//!
//! Holds every chunk in memory and ranks by cosine similarity. Suitable
//! for corpora up to a few hundred thousand chunks; beyond that an ANN
//! index would replace this adapter behind the same port.
//!
//! Chunks load from a JSONL file, one object per line:
//!
//! ```text
//! {"id": "frag-1", "source_document_id": "notice-42", "section_label": "Budget",
//!  "text": "Total: 1.2M EUR", "embedding": [0.1, ...], "attributes": {"lot": "2"}}
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tenderag_domain::{AttributeValue, EvidenceFragment};
use tenderag_application::ports::evidence_index::{EvidenceIndex, IndexError, SearchHit};
use tracing::{info, warn};

/// One indexed chunk: the fragment plus its embedding.
#[derive(Debug, Clone)]
struct IndexedChunk {
    fragment: EvidenceFragment,
    embedding: Vec<f32>,
}

/// JSONL record shape for one chunk.
#[derive(Debug, Deserialize)]
struct ChunkRecord {
    id: String,
    source_document_id: String,
    section_label: String,
    text: String,
    embedding: Vec<f32>,
    #[serde(default)]
    attributes: BTreeMap<String, AttributeValue>,
}

/// In-memory cosine-similarity index implementing [`EvidenceIndex`].
pub struct InMemoryEvidenceIndex {
    chunks: Vec<IndexedChunk>,
    dimension: usize,
}

impl InMemoryEvidenceIndex {
    /// Empty index (every search returns no hits).
    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            dimension: 0,
        }
    }

    /// Load chunks from a JSONL file. Lines that fail to parse or whose
    /// embedding dimension disagrees with the first chunk are skipped with
    /// a warning; a corrupt line must not take the whole corpus down.
    pub fn from_jsonl_file(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            IndexError::Unavailable(format!("Cannot open chunk file {}: {e}", path.display()))
        })?;

        let mut chunks = Vec::new();
        let mut dimension = 0usize;

        for (line_number, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                IndexError::Unavailable(format!("Read error in {}: {e}", path.display()))
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let record: ChunkRecord = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping malformed chunk at line {}: {e}", line_number + 1);
                    continue;
                }
            };

            if dimension == 0 {
                dimension = record.embedding.len();
            } else if record.embedding.len() != dimension {
                warn!(
                    "Skipping chunk '{}' with dimension {} (index dimension {})",
                    record.id,
                    record.embedding.len(),
                    dimension
                );
                continue;
            }

            let mut fragment = EvidenceFragment::new(
                record.id,
                record.source_document_id,
                record.section_label,
                record.text,
                0.0,
            );
            fragment.attributes = record.attributes;
            chunks.push(IndexedChunk {
                fragment,
                embedding: record.embedding,
            });
        }

        info!(
            "Loaded {} chunks (dimension {}) from {}",
            chunks.len(),
            dimension,
            path.display()
        );

        Ok(Self { chunks, dimension })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[async_trait]
impl EvidenceIndex for InMemoryEvidenceIndex {
    async fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        if self.chunks.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query_vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: query_vector.len(),
            });
        }

        let mut hits: Vec<SearchHit> = self
            .chunks
            .iter()
            .map(|chunk| SearchHit {
                fragment: chunk.fragment.clone(),
                score: cosine_similarity(query_vector, &chunk.embedding),
            })
            .collect();

        // Stable sort keeps input order for tied scores
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
