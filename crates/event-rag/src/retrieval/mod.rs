//! Semantic retrieval over the cached event corpus

pub mod search;
pub mod similarity;

pub use search::retrieve;
pub use similarity::cosine_similarity;
