//! Provider backends and the dispatch seam used by the failover loop.
//!
//! Each backend adapts one provider's native response envelope into plain
//! text; the failover loop only ever sees [`GenerationBackend`] and
//! [`ProviderError`], never provider-specific shapes.

pub mod groq;
pub mod openrouter;

use std::{future::Future, pin::Pin, sync::Arc};

use crate::{config::ProviderConfig, errors::ProviderError};

pub use groq::GroqClient;
pub use openrouter::OpenRouterClient;

/// A single generation request. Per-call overrides win over the descriptor's
/// defaults inside each backend.
#[derive(Clone, Debug, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Object-safe seam over one upstream provider.
pub trait GenerationBackend: Send + Sync {
    /// Short provider tag used in logs and results.
    fn name(&self) -> &str;

    /// Issues a single generation call and returns normalized plain text.
    fn generate<'a>(
        &'a self,
        req: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;
}

/// Builds backends from descriptors. Split out as a trait so the failover
/// state machine can be driven with scripted backends in tests.
pub trait BackendFactory: Send + Sync {
    fn build(&self, cfg: &ProviderConfig) -> Result<Arc<dyn GenerationBackend>, ProviderError>;
}

/// Default factory constructing real HTTP clients.
pub struct HttpBackendFactory;

impl BackendFactory for HttpBackendFactory {
    fn build(&self, cfg: &ProviderConfig) -> Result<Arc<dyn GenerationBackend>, ProviderError> {
        match cfg.kind {
            crate::config::ProviderKind::Groq => Ok(Arc::new(GroqClient::new(cfg.clone())?)),
            crate::config::ProviderKind::OpenRouter => {
                Ok(Arc::new(OpenRouterClient::new(cfg.clone())?))
            }
        }
    }
}
