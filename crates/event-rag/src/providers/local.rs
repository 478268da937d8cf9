//! Local filesystem corpus loader
//!
//! Each event is one JSON file `{data_dir}/{event_id}.json`:
//!
//! ```json
//! {
//!   "documents": [{ "content": "...", "metadata": { "title": "...", "url": "..." } }],
//!   "embeddings": [[0.12, -0.03, ...]]
//! }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::config::CorpusConfig;
use crate::error::{Error, Result};
use crate::types::{DocumentRecord, EmbeddingCorpus};

use super::corpus::CorpusLoader;

#[derive(Deserialize)]
struct CorpusFile {
    documents: Vec<DocumentRecord>,
    embeddings: Vec<Vec<f32>>,
}

/// Loads precomputed event corpora from JSON files
pub struct FileCorpusLoader {
    data_dir: PathBuf,
}

impl FileCorpusLoader {
    /// Create a loader rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &CorpusConfig) -> Self {
        Self::new(config.data_dir.clone())
    }

    /// Path of the corpus file for an event
    fn corpus_path(&self, event_id: &str) -> Result<PathBuf> {
        let valid = !event_id.is_empty()
            && event_id != "."
            && !event_id.contains("..")
            && !event_id.contains(['/', '\\']);
        if !valid {
            return Err(Error::corpus_unavailable(event_id, "invalid event id"));
        }
        Ok(self.data_dir.join(format!("{}.json", event_id)))
    }
}

#[async_trait]
impl CorpusLoader for FileCorpusLoader {
    async fn load_corpus(&self, event_id: &str) -> Result<EmbeddingCorpus> {
        let path = self.corpus_path(event_id)?;

        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::corpus_unavailable(
                event_id,
                format!("no precomputed embeddings at {}", path.display()),
            ),
            _ => Error::corpus_unavailable(
                event_id,
                format!("failed to read {}: {}", path.display(), e),
            ),
        })?;

        let file: CorpusFile = serde_json::from_slice(&bytes).map_err(|e| {
            Error::corpus_unavailable(event_id, format!("malformed corpus file: {}", e))
        })?;

        let corpus = EmbeddingCorpus::new(event_id, file.documents, file.embeddings)?;

        tracing::info!(
            "Loaded corpus for event {}: {} documents ({}d)",
            event_id,
            corpus.len(),
            corpus.dimensions()
        );

        Ok(corpus)
    }

    fn name(&self) -> &str {
        "file"
    }
}
