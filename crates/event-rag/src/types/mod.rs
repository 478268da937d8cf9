//! Core types for the event question-answering pipeline

pub mod document;
pub mod query;
pub mod response;

pub use document::{DocumentMetadata, DocumentRecord, EmbeddingCorpus};
pub use query::{EventSelection, QueryRequest};
pub use response::{Citation, QueryResult, RetrievedDocument};
