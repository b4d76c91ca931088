//! Error types for Parley.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Primary error type for all Parley operations.
#[derive(Error, Debug)]
pub enum ParleyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A credential needed before any external call is absent.
    #[error("Missing credential {name}: {hint}")]
    MissingCredential { name: String, hint: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Broad classification used for retry decisions and HTTP status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    RateLimit,
    Network,
    Server,
    Api,
    Serialization,
    ToolExecution,
    InvalidInput,
    Unknown,
}

impl ParleyError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a missing-credential error with the prompt shown to the user.
    pub fn missing_credential(name: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingCredential {
            name: name.into(),
            hint: hint.into(),
        }
    }

    /// Create a tool execution error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) | Self::MissingCredential { .. } => {
                ErrorCategory::Configuration
            }
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::ToolExecution { .. } => ErrorCategory::ToolExecution,
            Self::InvalidArgument(_) => ErrorCategory::InvalidInput,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server
        )
    }
}

impl From<toml::de::Error> for ParleyError {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ParleyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_maps_to_category() {
        assert_eq!(ParleyError::api(401, "no").category(), ErrorCategory::Authentication);
        assert_eq!(ParleyError::api(429, "slow").category(), ErrorCategory::RateLimit);
        assert_eq!(ParleyError::api(503, "down").category(), ErrorCategory::Server);
        assert_eq!(ParleyError::api(400, "bad").category(), ErrorCategory::Api);
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(ParleyError::api(502, "gateway").is_retryable());
        assert!(ParleyError::RateLimited { retry_after_ms: None }.is_retryable());
        assert!(!ParleyError::api(404, "missing").is_retryable());
        assert!(!ParleyError::missing_credential("OPENAI_API_KEY", "set it").is_retryable());
        assert!(!ParleyError::InvalidArgument("x".into()).is_retryable());
    }

    #[test]
    fn missing_credential_message_includes_hint() {
        let err = ParleyError::missing_credential("OPENAI_API_KEY", "Add your OpenAI API key.");
        assert_eq!(
            err.to_string(),
            "Missing credential OPENAI_API_KEY: Add your OpenAI API key."
        );
    }
}
