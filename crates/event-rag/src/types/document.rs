//! Event documents and their precomputed embeddings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Source metadata attached to a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document title (article headline, report name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Link to the original source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Any other fields carried by the event data (publisher, date, ...)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl DocumentMetadata {
    /// Metadata with a title only
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Set the source URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Format source for display: `Title (url)`, falling back to whichever exists
    pub fn format_source(&self) -> String {
        match (&self.title, &self.url) {
            (Some(title), Some(url)) => format!("{} ({})", title, url),
            (Some(title), None) => title.clone(),
            (None, Some(url)) => url.clone(),
            (None, None) => "Untitled source".to_string(),
        }
    }
}

/// A single source document of an event
///
/// Documents have no identifier of their own: they are addressed by their
/// position inside the corpus they were loaded with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Text content
    pub content: String,
    /// Source metadata
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl DocumentRecord {
    /// Create a new document
    pub fn new(content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// All documents of one event together with their embeddings
///
/// `documents[i]` is described by `embeddings[i]`. Built once per event load and
/// never mutated; switching events replaces the whole corpus.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingCorpus {
    event_id: String,
    documents: Vec<DocumentRecord>,
    embeddings: Vec<Vec<f32>>,
}

impl EmbeddingCorpus {
    /// Build a corpus, checking that documents and embeddings line up
    pub fn new(
        event_id: impl Into<String>,
        documents: Vec<DocumentRecord>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        let event_id = event_id.into();

        if documents.is_empty() {
            return Err(Error::corpus_unavailable(event_id, "corpus contains no documents"));
        }

        if documents.len() != embeddings.len() {
            return Err(Error::corpus_unavailable(
                event_id,
                format!(
                    "{} documents but {} embeddings",
                    documents.len(),
                    embeddings.len()
                ),
            ));
        }

        let dimensions = embeddings[0].len();
        if dimensions == 0 {
            return Err(Error::corpus_unavailable(event_id, "embeddings are empty"));
        }
        if let Some(pos) = embeddings.iter().position(|e| e.len() != dimensions) {
            return Err(Error::corpus_unavailable(
                event_id,
                format!(
                    "embedding {} has {} dimensions, expected {}",
                    pos,
                    embeddings[pos].len(),
                    dimensions
                ),
            ));
        }

        Ok(Self {
            event_id,
            documents,
            embeddings,
        })
    }

    /// Event this corpus belongs to
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Documents in corpus order
    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    /// Embeddings in corpus order
    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    /// Embedding dimensionality shared by every row
    pub fn dimensions(&self) -> usize {
        self.embeddings[0].len()
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Always false for a constructed corpus
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
