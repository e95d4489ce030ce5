//! Embedding pipeline and job similarity retrieval over Qdrant.
//!
//! Goals:
//! - Turn long documents (resumes, job descriptions) into single fixed-size
//!   vectors via chunking and mean pooling.
//! - Keep one collection of resume and job points and answer "jobs similar to
//!   this resume" queries with deduplicated, normalized matches.
//!
//! Notes:
//! - All Qdrant calls go through [`QdrantFacade`]; `filters.rs` and
//!   `store.rs` only build the `qdrant-client` request types it consumes.
//! - Embedding backends are pluggable behind [`EmbeddingsProvider`].

pub mod chunk;
pub mod config;
pub mod embed;
pub mod errors;
pub mod filters;
pub mod ids;
pub mod pipeline;
pub mod qdrant_facade;
pub mod records;
pub mod store;

pub use config::StoreConfig;
pub use embed::{EmbeddingsProvider, HfEndpointEmbedder};
pub use errors::StoreError;
pub use pipeline::EmbeddingPipeline;
pub use qdrant_facade::QdrantFacade;
pub use records::{JobMatch, JobPosting};
pub use store::JobMatchStore;
