//! Unified error types for the crate.

use std::time::Duration;

use thiserror::Error;

/// Failure to locate parseable JSON in a model response.
#[derive(Debug, Error)]
#[error("no parseable JSON in response: {reason}")]
pub struct ExtractError {
    pub reason: String,
}

impl ExtractError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Top-level error for analysis operations.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Generation failed across all providers.
    #[error(transparent)]
    Llm(#[from] llm_failover::LlmError),

    /// Response carried no parseable JSON.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// JSON parsed but did not fit the expected record shape.
    #[error("unexpected analysis shape: {0}")]
    Shape(#[from] serde_json::Error),

    /// Per-job deadline elapsed.
    #[error("analysis timed out after {0:?}")]
    Timeout(Duration),

    /// Report requested over zero analyses.
    #[error("no analyses to generate report from")]
    EmptyReport,
}
