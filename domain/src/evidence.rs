//! Evidence domain entities
//!
//! An [`EvidenceFragment`] is one scored, retrieved unit of notice text.
//! Fragments are produced by a single retrieval call, are read-only once
//! created, and are not persisted beyond the turn unless the caller logs
//! them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scalar structured attribute attached to a fragment
/// (e.g. `budget`, `deadline`, `contracting_authority`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Text(s) => write!(f, "{}", s),
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One scored, retrieved unit of source text from the notice corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceFragment {
    /// Unique fragment id within the index
    pub id: String,
    /// Id of the notice document the fragment was chunked from
    pub source_document_id: String,
    /// Section heading within the source document (e.g. "Award criteria")
    pub section_label: String,
    /// The fragment text itself
    pub text: String,
    /// Cosine similarity against the query, higher is closer
    pub similarity_score: f32,
    /// Scalar attributes extracted at indexing time
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl EvidenceFragment {
    pub fn new(
        id: impl Into<String>,
        source_document_id: impl Into<String>,
        section_label: impl Into<String>,
        text: impl Into<String>,
        similarity_score: f32,
    ) -> Self {
        Self {
            id: id.into(),
            source_document_id: source_document_id.into(),
            section_label: section_label.into(),
            text: text.into(),
            similarity_score,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Short one-line summary used in reviewer context and the final result.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}): {}",
            self.source_document_id,
            self.section_label,
            crate::util::truncate(&self.text, 120)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_with_attributes() {
        let fragment = EvidenceFragment::new("frag-1", "notice-42", "Budget", "Total: 1.2M EUR", 0.91)
            .with_attribute("budget_eur", AttributeValue::Number(1_200_000.0))
            .with_attribute("lot", AttributeValue::Text("2".into()));

        assert_eq!(fragment.attributes.len(), 2);
        assert_eq!(
            fragment.attributes.get("lot").and_then(|v| v.as_text()),
            Some("2")
        );
    }

    #[test]
    fn test_fragment_summary_truncates() {
        let long_text = "x".repeat(500);
        let fragment = EvidenceFragment::new("f", "doc", "Scope", long_text, 0.5);
        assert!(fragment.summary().len() < 200);
        assert!(fragment.summary().starts_with("doc (Scope):"));
    }
}
