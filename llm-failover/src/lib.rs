//! Ordered-provider text generation with failure-aware fallback.
//!
//! The crate exposes a single entry point, [`FailoverService`], which walks a
//! fixed, priority-ordered list of generation providers (Groq first, then
//! OpenRouter). Transient failures are retried locally with exponential
//! backoff; credential and quota failures skip straight to the next provider.
//! Callers only ever see normalized plain text or
//! [`LlmError::AllProvidersFailed`].

pub mod backends;
pub mod config;
pub mod errors;
pub mod failover;

pub use config::{ProviderConfig, ProviderKind, RetryPolicy};
pub use errors::{ErrorClass, LlmError, ProviderError};
pub use failover::{FailoverService, GenerationResult};
