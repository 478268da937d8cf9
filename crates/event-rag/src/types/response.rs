//! Per-query result types

use serde::{Deserialize, Serialize};

use super::document::{DocumentMetadata, DocumentRecord};

/// A corpus document selected for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Text content
    pub content: String,
    /// Source metadata
    pub metadata: DocumentMetadata,
    /// Cosine similarity to the query (-1.0 to 1.0)
    pub score: f32,
    /// Rank among retrieved documents (1 = most similar)
    pub rank: usize,
    /// Number the generator is told to cite this source by.
    /// Only meaningful for the query that produced it.
    pub position_id: usize,
}

impl RetrievedDocument {
    /// Build from a corpus document
    pub fn from_record(record: &DocumentRecord, score: f32, rank: usize) -> Self {
        Self {
            content: record.content.clone(),
            metadata: record.metadata.clone(),
            score,
            rank,
            position_id: rank,
        }
    }
}

/// A source referenced by the answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Number used by the bracketed `[n]` markers in the answer
    pub source_id: usize,
    /// Source text
    pub content: String,
    /// Source metadata
    pub metadata: DocumentMetadata,
}

impl Citation {
    /// Citation for a retrieved document, numbered by its position id
    pub fn from_retrieved(doc: &RetrievedDocument) -> Self {
        Self {
            source_id: doc.position_id,
            content: doc.content.clone(),
            metadata: doc.metadata.clone(),
        }
    }

    /// Same source under a new number
    pub fn renumbered(&self, source_id: usize) -> Self {
        Self {
            source_id,
            ..self.clone()
        }
    }

    /// Format citation for a sources list, e.g. `[2] Levee breach (https://...)`
    pub fn format_inline(&self) -> String {
        format!("[{}] {}", self.source_id, self.metadata.format_source())
    }
}

/// Final answer for a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Answer with canonical markers `[1]..[N]`
    pub answer_text: String,
    /// Cited sources; `citations[k - 1]` backs every `[k]` in `answer_text`
    pub citations: Vec<Citation>,
    /// Answer exactly as returned by the generator
    pub raw_answer_text: String,
    /// Event the answer was produced for
    pub event_id: String,
    /// Number of sources shown to the generator
    pub sources_retrieved: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl QueryResult {
    /// Render the cited sources as a numbered list
    pub fn format_sources(&self) -> String {
        self.citations
            .iter()
            .map(Citation::format_inline)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
