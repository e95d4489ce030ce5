//! Ordered-provider dispatch with classification, bounded retry, and fallback.
//!
//! One [`FailoverService`] owns the fixed provider order and a lazily built
//! client per provider. Construct once, wrap in `Arc`, and pass clones to
//! dependents; the client cache is guarded by per-provider one-time init, so
//! concurrent first use from several jobs never builds duplicate clients.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::{
    backends::{BackendFactory, GenerationBackend, GenerationRequest, HttpBackendFactory},
    config::{ProviderConfig, RetryPolicy},
    errors::{ConfigError, ErrorClass, LlmError, ProviderError},
};

/// Normalized outcome of a successful generation.
#[derive(Clone, Debug)]
pub struct GenerationResult {
    /// Plain text with all provider envelope shapes stripped.
    pub text: String,
    /// Tag of the provider that succeeded.
    pub provider: String,
    /// Total attempts made across all providers, including the winning one.
    pub attempts: u32,
}

/// Walks providers in fixed priority order until one produces text.
pub struct FailoverService {
    providers: Vec<ProviderConfig>,
    retry: RetryPolicy,
    factory: Box<dyn BackendFactory>,
    clients: Vec<OnceCell<Arc<dyn GenerationBackend>>>,
}

impl FailoverService {
    /// Creates a service over the given ordered providers with default HTTP
    /// backends and the default backoff schedule.
    ///
    /// # Errors
    /// [`ConfigError::NoProviders`] when the list is empty.
    pub fn new(providers: Vec<ProviderConfig>) -> Result<Self, LlmError> {
        Self::with_factory(providers, RetryPolicy::default(), Box::new(HttpBackendFactory))
    }

    /// Creates a service from `GROQ_API_KEY` / `OPENROUTER_API_KEY`.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(ProviderConfig::ordered_from_env()?)
    }

    /// Full-control constructor; the factory seam exists for tests.
    pub fn with_factory(
        providers: Vec<ProviderConfig>,
        retry: RetryPolicy,
        factory: Box<dyn BackendFactory>,
    ) -> Result<Self, LlmError> {
        if providers.is_empty() {
            return Err(ConfigError::NoProviders.into());
        }
        let clients = providers.iter().map(|_| OnceCell::new()).collect();
        Ok(Self {
            providers,
            retry,
            factory,
            clients,
        })
    }

    /// Generates text for `prompt`, overriding token/temperature defaults when
    /// given.
    ///
    /// Per provider: a fatal-auth or rate-limit failure abandons the provider
    /// for this request immediately; retryable failures are retried locally up
    /// to the provider's `max_retries` with exponential backoff; the first
    /// success returns at once.
    ///
    /// # Errors
    /// [`LlmError::AllProvidersFailed`] only when every provider has been
    /// exhausted; the last observed error is carried inside.
    pub async fn ask(
        &self,
        prompt: &str,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<GenerationResult, LlmError> {
        let req = GenerationRequest {
            prompt: prompt.to_owned(),
            max_tokens,
            temperature,
        };

        let mut last_err: Option<ProviderError> = None;
        let mut total_attempts = 0u32;

        for (idx, cfg) in self.providers.iter().enumerate() {
            debug!(provider = cfg.kind.as_str(), "trying provider");

            let client = match self.client_for(idx, cfg).await {
                Ok(c) => c,
                Err(e) => {
                    warn!(
                        provider = cfg.kind.as_str(),
                        error = %e,
                        "provider init failed; moving to next provider"
                    );
                    last_err = Some(e);
                    continue;
                }
            };

            let mut attempt = 0u32;
            loop {
                attempt += 1;
                total_attempts += 1;

                match client.generate(&req).await {
                    Ok(text) => {
                        info!(
                            provider = cfg.kind.as_str(),
                            attempts = total_attempts,
                            "provider succeeded"
                        );
                        return Ok(GenerationResult {
                            text,
                            provider: cfg.kind.as_str().to_string(),
                            attempts: total_attempts,
                        });
                    }
                    Err(e) => {
                        let class = ErrorClass::of(&e);
                        warn!(
                            provider = cfg.kind.as_str(),
                            attempt,
                            error = %e,
                            ?class,
                            "provider call failed"
                        );
                        last_err = Some(e);

                        match class {
                            // Provider-level failures: retrying locally only
                            // wastes latency.
                            ErrorClass::FatalAuth | ErrorClass::RateLimited => break,
                            ErrorClass::Retryable => {
                                if attempt > cfg.max_retries {
                                    debug!(
                                        provider = cfg.kind.as_str(),
                                        "retries exhausted; moving to next provider"
                                    );
                                    break;
                                }
                                let delay = self.retry.delay_for(attempt);
                                debug!(
                                    provider = cfg.kind.as_str(),
                                    delay_ms = delay.as_millis() as u64,
                                    "backing off before retry"
                                );
                                tokio::time::sleep(delay).await;
                            }
                        }
                    }
                }
            }
        }

        error!(attempts = total_attempts, "all generation providers exhausted");
        Err(LlmError::AllProvidersFailed {
            attempts: total_attempts,
            last: last_err.unwrap_or_else(|| ProviderError::Init("no providers tried".into())),
        })
    }

    /// Lazily builds and caches the backend for provider `idx`. A failed build
    /// leaves the cell unset, so the next request tries again.
    async fn client_for(
        &self,
        idx: usize,
        cfg: &ProviderConfig,
    ) -> Result<Arc<dyn GenerationBackend>, ProviderError> {
        self.clients[idx]
            .get_or_try_init(|| async { self.factory.build(cfg) })
            .await
            .cloned()
    }
}
