//! Provider abstractions for embeddings, answer generation and corpus loading
//!
//! The pipeline only talks to these traits, so the Ollama and filesystem
//! backends can be swapped (or faked in tests) without touching it.

pub mod corpus;
pub mod embedding;
pub mod llm;
pub mod local;
pub mod ollama;

pub use corpus::CorpusLoader;
pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use local::FileCorpusLoader;
pub use ollama::{OllamaEmbedder, OllamaLlm, OllamaProvider};
