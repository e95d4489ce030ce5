//! Runtime and collection configuration.

use crate::errors::StoreError;

/// Dimensionality of `sentence-transformers/all-MiniLM-L6-v2` embeddings.
pub const EMBEDDING_DIM: usize = 384;

/// Default collection holding resume and job points together.
pub const DEFAULT_COLLECTION: &str = "job-recommender";

/// Configuration for the job match store.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Fixed embedding dimension for the collection.
    pub dim: usize,
    /// Maximum characters per embedding chunk.
    pub chunk_max_chars: usize,
}

impl StoreConfig {
    /// Sane defaults for a given Qdrant endpoint.
    pub fn new_default(url: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: DEFAULT_COLLECTION.into(),
            dim: EMBEDDING_DIM,
            chunk_max_chars: 500,
        }
    }

    /// Builds a config from `QDRANT_URL` / `QDRANT_API_KEY`, falling back to
    /// a local instance.
    pub fn from_env() -> Self {
        let url = std::env::var("QDRANT_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:6334".into());
        let mut cfg = Self::new_default(url);
        cfg.qdrant_api_key = std::env::var("QDRANT_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());
        cfg
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(StoreError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(StoreError::Config("collection is empty".into()));
        }
        if self.dim == 0 {
            return Err(StoreError::Config("dim must be > 0".into()));
        }
        if self.chunk_max_chars == 0 {
            return Err(StoreError::Config("chunk_max_chars must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = StoreConfig::new_default("http://localhost:6334");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.dim, 384);
        assert_eq!(cfg.collection, "job-recommender");
    }

    #[test]
    fn empty_url_is_rejected() {
        let cfg = StoreConfig::new_default("  ");
        assert!(cfg.validate().is_err());
    }
}
