//! Application state for the event server

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::RagConfig;
use crate::error::Result;
use crate::pipeline::{HealthProbe, QueryPipeline};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// The single pipeline; queries are serialized through the lock
    pipeline: Mutex<QueryPipeline>,
    /// Collaborator health checks, callable while a query holds the pipeline
    health: HealthProbe,
    /// Last selection committed by the pipeline, readable while a query runs
    selected_event: RwLock<Option<String>>,
}

impl AppState {
    /// Create state with Ollama collaborators and the file corpus loader
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing event server state...");
        let pipeline = QueryPipeline::from_config(&config)?;
        Ok(Self::with_pipeline(config, pipeline))
    }

    /// Create state around an already built pipeline
    pub fn with_pipeline(config: RagConfig, pipeline: QueryPipeline) -> Self {
        let health = pipeline.health_probe();
        let selected_event = pipeline.selected_event().map(str::to_string);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pipeline: Mutex::new(pipeline),
                health,
                selected_event: RwLock::new(selected_event),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Exclusive access to the pipeline for the duration of one request
    pub async fn pipeline(&self) -> MutexGuard<'_, QueryPipeline> {
        self.inner.pipeline.lock().await
    }

    /// Health checks that never wait for the pipeline lock
    pub fn health(&self) -> &HealthProbe {
        &self.inner.health
    }

    /// Selected event as of the last completed request
    pub fn selected_event(&self) -> Option<String> {
        self.inner.selected_event.read().clone()
    }

    /// Record the pipeline's selection after a request that may have changed it
    pub fn sync_selected_event(&self, pipeline: &QueryPipeline) {
        *self.inner.selected_event.write() = pipeline.selected_event().map(str::to_string);
    }
}
