//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for embedding and retrieval operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Embedding endpoint call failed (non-timeout).
    #[error("embedding error: {0}")]
    Embed(String),

    /// Embedding endpoint timed out; the only retryable embedding failure.
    #[error("embedding request timed out")]
    EmbedTimeout,

    /// Mismatch between a produced vector and the collection dimension.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// A point id that must exist carries no vector. Indicates an upsert that
    /// never happened or a wiped collection; always propagated to the caller.
    #[error("no vector stored for id '{id}'")]
    MissingVector { id: String },

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StoreError::EmbedTimeout
        } else {
            StoreError::Embed(e.to_string())
        }
    }
}
