//! Unified error hierarchy and failure classification.
//!
//! Goals:
//! - Single root [`LlmError`] for all public functions.
//! - Provider-aware mapping (401→Unauthorized, 429→RateLimited, 5xx→Server, etc.).
//! - [`ErrorClass`] drives the failover loop: fatal/quota errors switch
//!   providers immediately, transient ones get bounded local retries.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type LlmResult<T> = Result<T, LlmError>;

/// Root error type for the llm-failover crate.
#[derive(Debug, Error)]
pub enum LlmError {
    /// A single provider call or client build failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Configuration problems (missing keys, bad endpoints, empty provider list).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Every configured provider was exhausted without a successful generation.
    #[error("all providers failed after {attempts} attempts: {last}")]
    AllProvidersFailed { attempts: u32, last: ProviderError },
}

/// Detailed provider-level error used inside backends and the failover loop.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Rate limited (HTTP 429) or quota exceeded.
    #[error("rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Gateway/server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (4xx/3xx) not covered above.
    #[error("http status {status}: {snippet}")]
    HttpStatus { status: u16, snippet: String },

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Response payload could not be decoded into the expected envelope.
    #[error("decode error: {0}")]
    Decode(String),

    /// The completion envelope carried no usable choice.
    #[error("empty choices in completion response")]
    EmptyChoices,

    /// Backend client construction failed.
    #[error("client init failed: {0}")]
    Init(String),
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (limits, timeouts).
    #[error("invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    /// No provider had a usable credential.
    #[error("no generation providers configured")]
    NoProviders,

    /// Endpoint does not start with http:// or https://.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Coarse failure class consumed by the failover state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad/expired credential. Abandon the provider for this request.
    FatalAuth,
    /// Quota or rate limit hit. Abandon the provider for this request.
    RateLimited,
    /// Transient network/5xx/timeout. Worth a bounded local retry.
    Retryable,
}

impl ErrorClass {
    /// Classifies a provider failure from its structured variant, falling back
    /// to message heuristics for shapeless errors. Unknown errors default to
    /// `Retryable` (optimistic: a provider switch is more expensive than one
    /// wasted retry).
    pub fn of(err: &ProviderError) -> Self {
        match err {
            ProviderError::Unauthorized | ProviderError::Forbidden => ErrorClass::FatalAuth,
            ProviderError::RateLimited { .. } => ErrorClass::RateLimited,
            ProviderError::Server(_) | ProviderError::Timeout => ErrorClass::Retryable,
            ProviderError::HttpStatus { status, .. } if (500..600).contains(status) => {
                ErrorClass::Retryable
            }
            other => Self::from_message(&other.to_string()),
        }
    }

    fn from_message(msg: &str) -> Self {
        let msg = msg.to_ascii_lowercase();
        if msg.contains("unauthorized") || msg.contains("invalid") || msg.contains("expired") {
            return ErrorClass::FatalAuth;
        }
        if msg.contains("rate limit") || msg.contains("quota") {
            return ErrorClass::RateLimited;
        }
        ErrorClass::Retryable
    }
}

// ===== Conversions for `?` ergonomics =====

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ProviderError::Timeout;
        }
        if let Some(status) = e.status() {
            let code = status.as_u16();
            return match code {
                401 => ProviderError::Unauthorized,
                403 => ProviderError::Forbidden,
                429 => ProviderError::RateLimited {
                    retry_after_secs: None,
                },
                500..=599 => ProviderError::Server(code),
                _ => ProviderError::HttpStatus {
                    status: code,
                    snippet: String::new(),
                },
            };
        }
        ProviderError::Network(e.to_string())
    }
}

/// Maps a non-success HTTP status plus a body snippet into a [`ProviderError`].
pub(crate) fn status_error(status: u16, body: &str) -> ProviderError {
    match status {
        401 => ProviderError::Unauthorized,
        403 => ProviderError::Forbidden,
        429 => ProviderError::RateLimited {
            retry_after_secs: None,
        },
        500..=599 => ProviderError::Server(status),
        _ => ProviderError::HttpStatus {
            status,
            snippet: make_snippet(body),
        },
    }
}

/// Trims a response body to a short, single-line snippet for logs and errors.
pub(crate) fn make_snippet(body: &str) -> String {
    const MAX: usize = 200;
    let compact: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.len() <= MAX {
        compact
    } else {
        let mut cut = MAX;
        while !compact.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…", &compact[..cut])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_are_fatal() {
        assert_eq!(ErrorClass::of(&ProviderError::Unauthorized), ErrorClass::FatalAuth);
        assert_eq!(ErrorClass::of(&ProviderError::Forbidden), ErrorClass::FatalAuth);
    }

    #[test]
    fn quota_errors_switch_provider() {
        let err = ProviderError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert_eq!(ErrorClass::of(&err), ErrorClass::RateLimited);
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert_eq!(ErrorClass::of(&ProviderError::Timeout), ErrorClass::Retryable);
        assert_eq!(ErrorClass::of(&ProviderError::Server(503)), ErrorClass::Retryable);
        let err = ProviderError::Network("failed to connect".into());
        assert_eq!(ErrorClass::of(&err), ErrorClass::Retryable);
    }

    #[test]
    fn message_heuristics_catch_expired_keys() {
        let err = ProviderError::Decode("token expired".into());
        assert_eq!(ErrorClass::of(&err), ErrorClass::FatalAuth);
        let err = ProviderError::Network("monthly quota exhausted".into());
        assert_eq!(ErrorClass::of(&err), ErrorClass::RateLimited);
    }

    #[test]
    fn unknown_errors_default_to_retryable() {
        assert_eq!(ErrorClass::of(&ProviderError::EmptyChoices), ErrorClass::Retryable);
    }

    #[test]
    fn status_error_maps_common_codes() {
        assert!(matches!(status_error(401, ""), ProviderError::Unauthorized));
        assert!(matches!(status_error(429, ""), ProviderError::RateLimited { .. }));
        assert!(matches!(status_error(502, ""), ProviderError::Server(502)));
        assert!(matches!(status_error(404, "nope"), ProviderError::HttpStatus { status: 404, .. }));
    }

    #[test]
    fn snippet_is_single_line_and_bounded() {
        let s = make_snippet("a\nb\t c   d");
        assert_eq!(s, "a b c d");
        let long = "x".repeat(500);
        assert!(make_snippet(&long).len() <= 210);
    }
}
