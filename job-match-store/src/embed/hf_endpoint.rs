//! Hosted feature-extraction embedding provider.
//!
//! Calls the HuggingFace Inference API for
//! `sentence-transformers/all-MiniLM-L6-v2` (384-dim sentence vectors).
//! Timeouts map to [`StoreError::EmbedTimeout`] so the pipeline can retry
//! only that failure class.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{embed::EmbeddingsProvider, errors::StoreError};

const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
const DEFAULT_BASE: &str = "https://api-inference.huggingface.co";

/// Configuration for the hosted embedding backend.
#[derive(Clone, Debug)]
pub struct HfEndpointConfig {
    pub api_token: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl HfEndpointConfig {
    /// Builds a config from `HF_API_TOKEN` (required) and optional
    /// `HF_EMBED_MODEL` / `HF_EMBED_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, StoreError> {
        let api_token = std::env::var("HF_API_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| StoreError::Config("HF_API_TOKEN is not set".into()))?;
        let model = std::env::var("HF_EMBED_MODEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.into());
        let timeout_secs = std::env::var("HF_EMBED_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);
        Ok(Self {
            api_token,
            model,
            base_url: DEFAULT_BASE.into(),
            timeout_secs,
        })
    }
}

/// Embedding provider backed by the hosted feature-extraction endpoint.
pub struct HfEndpointEmbedder {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl HfEndpointEmbedder {
    /// Creates a new embedder.
    ///
    /// # Errors
    /// [`StoreError::Config`] for an unusable token; `Embed` when the HTTP
    /// client cannot be built.
    pub fn new(cfg: HfEndpointConfig) -> Result<Self, StoreError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", cfg.api_token))
                .map_err(|e| StoreError::Config(format!("invalid API token header: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Embed(e.to_string()))?;

        let url = format!(
            "{}/pipeline/feature-extraction/{}",
            cfg.base_url.trim_end_matches('/'),
            cfg.model
        );

        info!(model = %cfg.model, timeout_secs = cfg.timeout_secs, "HfEndpointEmbedder initialized");

        Ok(Self {
            client,
            url,
            model: cfg.model,
        })
    }

    async fn call(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        let started = Instant::now();
        debug!(model = %self.model, text_len = text.len(), "POST {}", self.url);

        let resp = self
            .client
            .post(&self.url)
            .json(&EmbedRequest {
                inputs: text,
                options: EmbedOptions { wait_for_model: true },
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            warn!(status, "feature-extraction returned non-success status");
            let snippet: String = body.chars().take(200).collect();
            return Err(StoreError::Embed(format!("HTTP {status}: {snippet}")));
        }

        let out: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::Embed(format!("decode error: {e}")))?;

        let vector = match out {
            EmbedResponse::Single(v) => v,
            // Sentence-level models return one row per input.
            EmbedResponse::Batch(mut rows) => {
                if rows.is_empty() {
                    return Err(StoreError::Embed("empty embedding response".into()));
                }
                rows.swap_remove(0)
            }
        };

        info!(
            model = %self.model,
            dim = vector.len(),
            latency_ms = started.elapsed().as_millis() as u64,
            "embedding completed"
        );

        Ok(vector)
    }
}

impl EmbeddingsProvider for HfEndpointEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<f32>, StoreError>> + Send + 'a>,
    > {
        Box::pin(self.call(text))
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a str,
    options: EmbedOptions,
}

#[derive(Debug, Serialize)]
struct EmbedOptions {
    wait_for_model: bool,
}

/// The endpoint answers `[f32; dim]` for one input or `[[f32; dim]]` for a
/// batch, depending on model wrapping.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbedResponse {
    Single(Vec<f32>),
    Batch(Vec<Vec<f32>>),
}
