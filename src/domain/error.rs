use crate::domain::values::stage::Stage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Transient upstream failure (connect error, 5xx, timeout). Retryable.
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream throttled us. Retryable, but with a longer backoff.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// LLM response failed schema validation after all retries.
    #[error("Malformed LLM output: {0}")]
    MalformedLlmOutput(String),

    /// Absent API key or similar. Fatal, never retried.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// A stage was invoked before its predecessor produced output.
    #[error("Stage {stage} requires {precursor} to be done first")]
    PrecursorNotReady { stage: Stage, precursor: Stage },
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        DomainError::Database(s)
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}
