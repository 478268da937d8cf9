//! Question answering over the selected event
//!
//! ```text
//! question → embed → retrieve (cached corpus) → prompt → generate → extract → renumber
//! ```
//!
//! The pipeline owns the only cached state: the corpus of the current event
//! and the embedding provider handle. A corpus never outlives an event switch.

use std::sync::Arc;
use std::time::Instant;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::{canonicalize, PromptBuilder};
use crate::providers::{
    CorpusLoader, EmbeddingProvider, FileCorpusLoader, LlmProvider, OllamaProvider,
};
use crate::retrieval::retrieve;
use crate::types::{EmbeddingCorpus, QueryResult, RetrievedDocument};

struct Prepared {
    event_id: String,
    retrieved: Vec<RetrievedDocument>,
    prompt: String,
}

/// Health checks over the pipeline's collaborators, usable without the pipeline
#[derive(Clone)]
pub struct HealthProbe {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
}

impl HealthProbe {
    /// Whether both the embedder and the generator answer their health checks
    pub async fn check(&self) -> bool {
        let embedder = self.embedder.health_check().await.unwrap_or(false);
        let llm = self.llm.health_check().await.unwrap_or(false);
        if !(embedder && llm) {
            tracing::warn!(
                "Collaborators unhealthy (embedder {}: {}, llm {}: {})",
                self.embedder.name(),
                embedder,
                self.llm.name(),
                llm
            );
        }
        embedder && llm
    }
}

/// Cited question answering for one selected event at a time
///
/// `answer` takes `&mut self`; callers serialize queries.
pub struct QueryPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    loader: Arc<dyn CorpusLoader>,
    top_k: usize,
    selected_event: Option<String>,
    corpus: Option<Arc<EmbeddingCorpus>>,
}

impl QueryPipeline {
    /// Create a pipeline over the given collaborators
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        loader: Arc<dyn CorpusLoader>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            llm,
            loader,
            top_k,
            selected_event: None,
            corpus: None,
        }
    }

    /// Ollama for embeddings and generation, JSON files for corpora
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        config.validate()?;

        let (embedder, llm) =
            OllamaProvider::new(&config.llm, config.embeddings.dimensions)?.split();
        let loader = FileCorpusLoader::from_config(&config.corpus);

        tracing::info!(
            "Pipeline ready (embedder: {}, llm: {} / {}, corpus loader: {}, top_k: {})",
            embedder.name(),
            llm.name(),
            llm.model(),
            loader.name(),
            config.retrieval.top_k
        );

        Ok(Self::new(
            Arc::new(embedder),
            Arc::new(llm),
            Arc::new(loader),
            config.retrieval.top_k,
        ))
    }

    /// Currently selected event
    pub fn selected_event(&self) -> Option<&str> {
        self.selected_event.as_deref()
    }

    /// Event whose corpus is cached, if any
    pub fn cached_event(&self) -> Option<&str> {
        self.corpus.as_ref().map(|c| c.event_id())
    }

    /// Number of sources handed to the generator
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Whether both the embedder and the generator answer their health checks
    pub async fn health_check(&self) -> bool {
        self.health_probe().check().await
    }

    /// Handle for health checks that does not borrow the pipeline
    pub fn health_probe(&self) -> HealthProbe {
        HealthProbe {
            embedder: Arc::clone(&self.embedder),
            llm: Arc::clone(&self.llm),
        }
    }

    /// Change the selected event; a different event drops the cached corpus
    pub fn select_event(&mut self, event_id: Option<&str>) {
        let event_id = event_id.map(str::trim).filter(|id| !id.is_empty());
        if self.selected_event.as_deref() == event_id {
            return;
        }

        tracing::info!("Selected event: {:?}", event_id);
        self.selected_event = event_id.map(str::to_string);
        if self.cached_event() != event_id {
            self.invalidate();
        }
    }

    /// Drop the cached corpus so the next query reloads it
    pub fn invalidate(&mut self) {
        if let Some(corpus) = self.corpus.take() {
            tracing::info!("Invalidated cached corpus for event {}", corpus.event_id());
        }
    }

    /// Answer a question about an event.
    ///
    /// `event_id` falls back to the selected event; an explicit id different
    /// from the selection becomes the new selection.
    pub async fn answer(&mut self, query: &str, event_id: Option<&str>) -> Result<QueryResult> {
        Ok(self.answer_with_prompt(query, event_id).await?.0)
    }

    /// Same as `answer`, also returning the prompt the generator was given
    pub async fn answer_with_prompt(
        &mut self,
        query: &str,
        event_id: Option<&str>,
    ) -> Result<(QueryResult, String)> {
        let start = Instant::now();

        let prepared = self.prepare(query, event_id).await?;
        let raw_answer = self.llm.generate(&prepared.prompt).await?;

        let canonical = canonicalize(&raw_answer, &prepared.retrieved);

        let processing_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Query completed in {}ms, {} of {} sources cited",
            processing_time_ms,
            canonical.citations.len(),
            prepared.retrieved.len()
        );

        let result = QueryResult {
            answer_text: canonical.text,
            citations: canonical.citations,
            raw_answer_text: raw_answer,
            event_id: prepared.event_id,
            sources_retrieved: prepared.retrieved.len(),
            processing_time_ms,
        };
        Ok((result, prepared.prompt))
    }

    /// Prompt that `answer` would send to the generator, without generating
    pub async fn preview_prompt(&mut self, query: &str, event_id: Option<&str>) -> Result<String> {
        Ok(self.prepare(query, event_id).await?.prompt)
    }

    /// Validate, resolve the event, then embed and retrieve
    async fn prepare(&mut self, query: &str, event_id: Option<&str>) -> Result<Prepared> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::validation("question must not be empty"));
        }

        let event_id = match event_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => self
                .selected_event
                .clone()
                .ok_or_else(|| Error::validation("no event selected"))?,
        };
        self.select_event(Some(event_id.as_str()));

        tracing::info!("Query for event {}: \"{}\"", event_id, query);

        let corpus = self.corpus_for(&event_id).await?;

        let query_embedding = self.embedder.embed(query).await?;
        let retrieved = retrieve(&query_embedding, &corpus, self.top_k)?;
        let prompt = PromptBuilder::build_prompt(query, &retrieved);

        Ok(Prepared {
            event_id,
            retrieved,
            prompt,
        })
    }

    /// Cached corpus for the event, loading it on a miss
    async fn corpus_for(&mut self, event_id: &str) -> Result<Arc<EmbeddingCorpus>> {
        if let Some(corpus) = &self.corpus {
            if corpus.event_id() == event_id {
                return Ok(Arc::clone(corpus));
            }
            self.invalidate();
        }

        let corpus = Arc::new(self.loader.load_corpus(event_id).await?);
        if corpus.dimensions() != self.embedder.dimensions() {
            tracing::warn!(
                "Corpus for event {} has {} dimensions, embedder reports {}",
                event_id,
                corpus.dimensions(),
                self.embedder.dimensions()
            );
        }

        self.corpus = Some(Arc::clone(&corpus));
        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::types::{DocumentMetadata, DocumentRecord};

    struct FixedEmbedder {
        vector: Vec<f32>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
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
            "fixed"
        }
    }

    struct ScriptedLlm {
        reply: Result<String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(Error::generation(e.to_string())),
            }
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    struct CountingLoader {
        loads: AtomicUsize,
    }

    #[async_trait]
    impl CorpusLoader for CountingLoader {
        async fn load_corpus(&self, event_id: &str) -> Result<EmbeddingCorpus> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if event_id == "missing" {
                return Err(Error::corpus_unavailable(event_id, "no embeddings"));
            }
            let documents = vec![
                DocumentRecord::new(format!("{} report", event_id), DocumentMetadata::default()),
                DocumentRecord::new(format!("{} update", event_id), DocumentMetadata::default()),
            ];
            EmbeddingCorpus::new(event_id, documents, vec![vec![1.0, 0.0], vec![0.0, 1.0]])
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct Fixture {
        embedder: Arc<FixedEmbedder>,
        llm: Arc<ScriptedLlm>,
        loader: Arc<CountingLoader>,
        pipeline: QueryPipeline,
    }

    fn fixture(reply: Result<String>) -> Fixture {
        let embedder = Arc::new(FixedEmbedder {
            vector: vec![1.0, 0.0],
            calls: AtomicUsize::new(0),
        });
        let llm = Arc::new(ScriptedLlm {
            reply,
            prompts: Mutex::new(Vec::new()),
        });
        let loader = Arc::new(CountingLoader {
            loads: AtomicUsize::new(0),
        });
        let pipeline = QueryPipeline::new(embedder.clone(), llm.clone(), loader.clone(), 2);
        Fixture {
            embedder,
            llm,
            loader,
            pipeline,
        }
    }

    #[tokio::test]
    async fn test_validation_before_collaborators() {
        let mut f = fixture(Ok("unused".to_string()));

        let err = f.pipeline.answer("   ", Some("flood")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = f.pipeline.answer("What happened?", None).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert_eq!(f.loader.loads.load(Ordering::SeqCst), 0);
        assert_eq!(f.embedder.calls.load(Ordering::SeqCst), 0);
        assert!(f.llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corpus_cached_per_event() {
        let mut f = fixture(Ok("Levees held [1].".to_string()));

        f.pipeline.answer("Did levees hold?", Some("flood")).await.unwrap();
        f.pipeline.answer("Again?", Some("flood")).await.unwrap();
        assert_eq!(f.loader.loads.load(Ordering::SeqCst), 1);

        let result = f.pipeline.answer("And the quake?", Some("quake")).await.unwrap();
        assert_eq!(f.loader.loads.load(Ordering::SeqCst), 2);
        assert_eq!(result.event_id, "quake");
        assert_eq!(result.citations[0].content, "quake report");
        assert_eq!(f.pipeline.cached_event(), Some("quake"));
    }

    #[tokio::test]
    async fn test_select_event_invalidates() {
        let mut f = fixture(Ok("[1]".to_string()));

        f.pipeline.select_event(Some("flood"));
        f.pipeline.answer("Q?", None).await.unwrap();
        assert_eq!(f.pipeline.cached_event(), Some("flood"));

        f.pipeline.select_event(Some("flood"));
        assert_eq!(f.pipeline.cached_event(), Some("flood"));

        f.pipeline.select_event(Some("wildfire"));
        assert_eq!(f.pipeline.cached_event(), None);

        let result = f.pipeline.answer("Q?", None).await.unwrap();
        assert_eq!(result.event_id, "wildfire");
        assert_eq!(result.citations[0].content, "wildfire report");

        f.pipeline.select_event(None);
        assert!(f.pipeline.cached_event().is_none());
        assert!(f.pipeline.answer("Q?", None).await.is_err());
    }

    #[tokio::test]
    async fn test_corpus_unavailable_propagates() {
        let mut f = fixture(Ok("[1]".to_string()));

        let err = f.pipeline.answer("Q?", Some("missing")).await.unwrap_err();
        assert!(matches!(err, Error::CorpusUnavailable { .. }));
        assert_eq!(f.embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generation_error_propagates() {
        let mut f = fixture(Err(Error::generation("HTTP 503")));

        let err = f.pipeline.answer("Q?", Some("flood")).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(err.is_retryable());
        // The corpus stays cached for the retry
        assert_eq!(f.pipeline.cached_event(), Some("flood"));
    }

    #[tokio::test]
    async fn test_preview_prompt_skips_generation() {
        let mut f = fixture(Ok("unused".to_string()));

        let prompt = f.pipeline.preview_prompt("Status?", Some("flood")).await.unwrap();
        assert!(prompt.ends_with("Question: Status?\n\nAnswer:"));
        assert!(f.llm.prompts.lock().unwrap().is_empty());
        assert_eq!(f.embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_answer_with_prompt_embeds_once() {
        let mut f = fixture(Ok("Report [1].".to_string()));

        let (result, prompt) = f
            .pipeline
            .answer_with_prompt("Status?", Some("flood"))
            .await
            .unwrap();

        assert_eq!(result.answer_text, "Report [1].");
        assert_eq!(*f.llm.prompts.lock().unwrap(), vec![prompt]);
        assert_eq!(f.embedder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.loader.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_prompt_uses_position_ids() {
        let mut f = fixture(Ok("Update [2], report [1].".to_string()));

        let result = f.pipeline.answer("Status?", Some("flood")).await.unwrap();

        let prompts = f.llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("Source 1:\nContent: flood report"));
        assert!(prompts[0].contains("Source 2:\nContent: flood update"));

        assert_eq!(result.answer_text, "Update [1], report [2].");
        assert_eq!(result.raw_answer_text, "Update [2], report [1].");
        assert_eq!(result.citations[0].content, "flood update");
        assert_eq!(result.sources_retrieved, 2);
    }
}
