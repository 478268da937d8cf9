//! event-rag: cited question answering over precomputed disaster-event corpora
//!
//! A question about the selected event is embedded, matched against the
//! event's cached embeddings, answered by an LLM from the top-k numbered
//! sources, and returned with citation markers renumbered densely in
//! order of first appearance.

pub mod config;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::QueryPipeline;
pub use types::{
    document::{DocumentMetadata, DocumentRecord, EmbeddingCorpus},
    query::{EventSelection, QueryRequest},
    response::{Citation, QueryResult, RetrievedDocument},
};
