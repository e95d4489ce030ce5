//! Groq chat-completion backend (OpenAI-compatible wire format).
//!
//! Endpoint: `POST {endpoint}/openai/v1/chat/completions`, Bearer auth.
//! The envelope is normalized down to `choices[0].message.content` (with a
//! `choices[0].text` fallback for legacy completion shapes).

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    backends::{GenerationBackend, GenerationRequest},
    config::ProviderConfig,
    errors::{ProviderError, status_error},
};

/// Thin client for the Groq API.
#[derive(Debug)]
pub struct GroqClient {
    client: reqwest::Client,
    cfg: ProviderConfig,
    url: String,
}

impl GroqClient {
    /// Creates a new client from the descriptor.
    ///
    /// # Errors
    /// [`ProviderError::Init`] when the key is empty, the endpoint has a bad
    /// scheme, or the HTTP client cannot be built.
    pub fn new(cfg: ProviderConfig) -> Result<Self, ProviderError> {
        if cfg.api_key.trim().is_empty() {
            return Err(ProviderError::Init("missing Groq API key".into()));
        }
        cfg.validate_endpoint()
            .map_err(|e| ProviderError::Init(e.to_string()))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", cfg.api_key))
                .map_err(|e| ProviderError::Init(format!("invalid API key header: {e}")))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()?;

        let url = format!(
            "{}/openai/v1/chat/completions",
            cfg.endpoint.trim_end_matches('/')
        );

        info!(model = %cfg.model, timeout_secs = cfg.timeout_secs, "GroqClient initialized");

        Ok(Self { client, cfg, url })
    }

    async fn complete(&self, req: &GenerationRequest) -> Result<String, ProviderError> {
        let started = Instant::now();
        let body = ChatRequest::build(&self.cfg, req);

        debug!(model = %self.cfg.model, prompt_len = req.prompt.len(), "POST {}", self.url);

        let resp = self.client.post(&self.url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            warn!(
                status,
                latency_ms = started.elapsed().as_millis() as u64,
                "Groq chat completion returned non-success status"
            );
            return Err(status_error(status, &text));
        }

        let out: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("serde error: {e}")))?;

        let content = out
            .choices
            .into_iter()
            .find_map(|c| c.message.and_then(|m| m.content).or(c.text))
            .ok_or(ProviderError::EmptyChoices)?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis() as u64,
            "Groq chat completion completed"
        );

        Ok(content)
    }
}

impl GenerationBackend for GroqClient {
    fn name(&self) -> &str {
        "groq"
    }

    fn generate<'a>(
        &'a self,
        req: &'a GenerationRequest,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<String, ProviderError>> + Send + 'a>,
    > {
        Box::pin(self.complete(req))
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> ChatRequest<'a> {
    fn build(cfg: &'a ProviderConfig, req: &'a GenerationRequest) -> Self {
        Self {
            model: &cfg.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &req.prompt,
            }],
            temperature: req.temperature.or(cfg.temperature),
            top_p: cfg.top_p,
            max_tokens: req.max_tokens.or(cfg.max_tokens),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatMessageOut>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}
