//! Error types for the event question-answering pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or empty input (question, event selection)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// No precomputed embeddings could be loaded for the event
    #[error("No corpus available for event '{event_id}': {reason}")]
    CorpusUnavailable { event_id: String, reason: String },

    /// Query embedding and corpus embeddings disagree on dimensionality
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Embedding model failure
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Text generation failure (transport or provider side)
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config parse error
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a corpus-unavailable error
    pub fn corpus_unavailable(event_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorpusUnavailable {
            event_id: event_id.into(),
            reason: reason.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the caller may simply try the same request again.
    ///
    /// Only collaborator failures on the generation path qualify; bad input and
    /// missing corpora stay broken until the input or the data changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Generation(_) | Error::Embedding(_) | Error::Http(_))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Error::CorpusUnavailable { .. } => (StatusCode::NOT_FOUND, "corpus_unavailable"),
            Error::DimensionMismatch { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "dimension_mismatch")
            }
            Error::Embedding(_) => (StatusCode::SERVICE_UNAVAILABLE, "embedding_error"),
            Error::Generation(_) => (StatusCode::BAD_GATEWAY, "generation_error"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Toml(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::Http(_) => (StatusCode::BAD_GATEWAY, "http_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
