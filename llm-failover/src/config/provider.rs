//! Immutable per-provider descriptors and env-driven construction.

use crate::errors::{ConfigError, LlmError};

/// Upstream generation backend kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Groq,
    OpenRouter,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Groq => "groq",
            ProviderKind::OpenRouter => "openrouter",
        }
    }
}

/// Descriptor for one upstream provider.
///
/// Immutable after construction. The position inside the service's provider
/// list is the fixed priority order for the process lifetime.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    /// Hard per-call timeout.
    pub timeout_secs: u64,
    /// Local retries allowed for retryable failures before moving on
    /// (attempts = 1 initial + `max_retries`).
    pub max_retries: u32,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

impl ProviderConfig {
    /// Groq descriptor with the stack defaults.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::Groq,
            api_key: api_key.into(),
            model: "llama-3.3-70b-versatile".into(),
            endpoint: "https://api.groq.com".into(),
            timeout_secs: 60,
            max_retries: 2,
            temperature: Some(0.5),
            max_tokens: Some(1024),
            top_p: Some(0.95),
        }
    }

    /// OpenRouter descriptor with the stack defaults.
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::OpenRouter,
            api_key: api_key.into(),
            model: "mistralai/mistral-small-3.2-24b-instruct:free".into(),
            endpoint: "https://openrouter.ai".into(),
            timeout_secs: 60,
            max_retries: 2,
            temperature: Some(0.5),
            max_tokens: Some(1024),
            top_p: Some(0.95),
        }
    }

    /// Builds the priority-ordered provider list from the environment:
    /// Groq first when `GROQ_API_KEY` is set, then OpenRouter when
    /// `OPENROUTER_API_KEY` is set.
    ///
    /// Optional overrides: `GROQ_MODEL`, `OPENROUTER_MODEL`, `LLM_TEMPERATURE`,
    /// `LLM_MAX_TOKENS`, `LLM_TIMEOUT_SECS`, `LLM_PROVIDER_RETRIES`.
    ///
    /// # Errors
    /// [`ConfigError::NoProviders`] when neither key is present,
    /// [`ConfigError::InvalidNumber`] for malformed numeric overrides.
    pub fn ordered_from_env() -> Result<Vec<ProviderConfig>, LlmError> {
        let temperature = env_opt_f32("LLM_TEMPERATURE")?;
        let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;
        let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?;
        let max_retries = env_opt_u32("LLM_PROVIDER_RETRIES")?;

        let mut out = Vec::new();

        if let Some(key) = env_non_empty("GROQ_API_KEY") {
            let mut cfg = ProviderConfig::groq(key);
            if let Some(model) = env_non_empty("GROQ_MODEL") {
                cfg.model = model;
            }
            out.push(cfg);
        }
        if let Some(key) = env_non_empty("OPENROUTER_API_KEY") {
            let mut cfg = ProviderConfig::openrouter(key);
            if let Some(model) = env_non_empty("OPENROUTER_MODEL") {
                cfg.model = model;
            }
            out.push(cfg);
        }

        if out.is_empty() {
            return Err(ConfigError::NoProviders.into());
        }

        for cfg in &mut out {
            if let Some(t) = temperature {
                cfg.temperature = Some(t);
            }
            if let Some(m) = max_tokens {
                cfg.max_tokens = Some(m);
            }
            if let Some(s) = timeout_secs {
                cfg.timeout_secs = s;
            }
            if let Some(r) = max_retries {
                cfg.max_retries = r;
            }
        }

        Ok(out)
    }

    /// Validates the endpoint scheme.
    pub fn validate_endpoint(&self) -> Result<(), ConfigError> {
        let e = self.endpoint.trim();
        if e.starts_with("http://") || e.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidEndpoint(self.endpoint.clone()))
        }
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

fn env_opt_u32(name: &'static str) -> Result<Option<u32>, LlmError> {
    match env_non_empty(name) {
        Some(v) => v.parse::<u32>().map(Some).map_err(|_| {
            LlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        }),
        None => Ok(None),
    }
}

fn env_opt_u64(name: &'static str) -> Result<Option<u64>, LlmError> {
    match env_non_empty(name) {
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            LlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

fn env_opt_f32(name: &'static str) -> Result<Option<f32>, LlmError> {
    match env_non_empty(name) {
        Some(v) => v.parse::<f32>().map(Some).map_err(|_| {
            LlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected f32",
            })
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groq_defaults_match_stack() {
        let cfg = ProviderConfig::groq("k");
        assert_eq!(cfg.kind, ProviderKind::Groq);
        assert_eq!(cfg.timeout_secs, 60);
        assert_eq!(cfg.max_retries, 2);
        assert_eq!(cfg.top_p, Some(0.95));
        assert!(cfg.validate_endpoint().is_ok());
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let mut cfg = ProviderConfig::openrouter("k");
        cfg.endpoint = "ftp://openrouter.ai".into();
        assert!(cfg.validate_endpoint().is_err());
    }
}
