//! In-memory collaborators for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use event_rag::providers::{CorpusLoader, EmbeddingProvider, LlmProvider};
use event_rag::{DocumentMetadata, DocumentRecord, EmbeddingCorpus, Error, QueryPipeline, Result};

/// Returns the same query vector for every text
pub struct FakeEmbedder {
    pub vector: Vec<f32>,
    pub calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector.clone())
    }

    fn dimensions(&self) -> usize {
        self.vector.len()
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Replies with a scripted answer after `delay`, or fails when `reply` is `None`
pub struct FakeLlm {
    pub reply: Mutex<Option<String>>,
    pub prompts: Mutex<Vec<String>>,
    pub delay: Duration,
}

impl FakeLlm {
    pub fn answering(reply: impl Into<String>) -> Self {
        Self {
            reply: Mutex::new(Some(reply.into())),
            prompts: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub fn slow(reply: impl Into<String>, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::answering(reply)
        }
    }

    pub fn set_reply(&self, reply: impl Into<String>) {
        *self.reply.lock().unwrap() = Some(reply.into());
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::generation("Generation failed: HTTP 500 - model crashed"))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

/// Corpora held in memory, keyed by event id
#[derive(Default)]
pub struct MemoryCorpusLoader {
    pub corpora: HashMap<String, (Vec<DocumentRecord>, Vec<Vec<f32>>)>,
    pub loads: AtomicUsize,
}

impl MemoryCorpusLoader {
    pub fn with_event(
        mut self,
        event_id: &str,
        documents: Vec<DocumentRecord>,
        embeddings: Vec<Vec<f32>>,
    ) -> Self {
        self.corpora
            .insert(event_id.to_string(), (documents, embeddings));
        self
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CorpusLoader for MemoryCorpusLoader {
    async fn load_corpus(&self, event_id: &str) -> Result<EmbeddingCorpus> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let (documents, embeddings) = self
            .corpora
            .get(event_id)
            .cloned()
            .ok_or_else(|| Error::corpus_unavailable(event_id, "not loaded"))?;
        EmbeddingCorpus::new(event_id, documents, embeddings)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Five flood reports; against the query `[1, 0, 0]` they rank 2, 4, 0, 1, 3
pub fn flood_corpus() -> (Vec<DocumentRecord>, Vec<Vec<f32>>) {
    let titles = [
        "Rainfall totals",
        "School closures",
        "Shelter census",
        "Bridge inspection",
        "Evacuation order",
    ];
    let documents = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            DocumentRecord::new(
                format!("flood document {}", i),
                DocumentMetadata::titled(*title).with_url(format!("https://example.org/flood/{}", i)),
            )
        })
        .collect();
    let embeddings = vec![
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
        vec![1.0, 0.0, 0.0],
        vec![-1.0, 0.0, 0.0],
        vec![0.8, 0.6, 0.0],
    ];
    (documents, embeddings)
}

/// Two wildfire reports in the same space
pub fn wildfire_corpus() -> (Vec<DocumentRecord>, Vec<Vec<f32>>) {
    let documents = vec![
        DocumentRecord::new("Containment at 40%.", DocumentMetadata::titled("Fire update")),
        DocumentRecord::new("Air quality alert issued.", DocumentMetadata::titled("Air quality")),
    ];
    let embeddings = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]];
    (documents, embeddings)
}

pub struct Harness {
    pub embedder: Arc<FakeEmbedder>,
    pub llm: Arc<FakeLlm>,
    pub loader: Arc<MemoryCorpusLoader>,
}

impl Harness {
    /// Flood and wildfire events, query vector `[1, 0, 0]`
    pub fn new(llm: FakeLlm) -> Self {
        let (flood_docs, flood_embeddings) = flood_corpus();
        let (fire_docs, fire_embeddings) = wildfire_corpus();
        Self {
            embedder: Arc::new(FakeEmbedder::new(vec![1.0, 0.0, 0.0])),
            llm: Arc::new(llm),
            loader: Arc::new(
                MemoryCorpusLoader::default()
                    .with_event("flood-2024", flood_docs, flood_embeddings)
                    .with_event("wildfire-2023", fire_docs, fire_embeddings),
            ),
        }
    }

    pub fn pipeline(&self, top_k: usize) -> QueryPipeline {
        QueryPipeline::new(
            self.embedder.clone(),
            self.llm.clone(),
            self.loader.clone(),
            top_k,
        )
    }
}
