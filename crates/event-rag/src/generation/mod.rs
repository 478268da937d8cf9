//! Answer generation: prompt rendering, the Ollama client and citation canonicalization

pub mod citation;
pub mod ollama;
pub mod prompt;

pub use citation::{
    build_renumber_map, canonicalize, extract_citations, rewrite_and_reorder, CanonicalAnswer,
    RenumberMap,
};
pub use ollama::OllamaClient;
pub use prompt::PromptBuilder;
