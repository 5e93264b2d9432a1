//! Error types for classification and configuration

use thiserror::Error;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures of a single `classify` call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Backend or model failed to load; the gateway is ready for a retry
    #[error("Model initialization failed: {0}")]
    ModelInitialization(String),

    /// Connection refused, DNS failure and the like
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded its deadline
    #[error("Request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Image could not be read, decoded or resized
    #[error("Image decode error: {0}")]
    Decode(String),

    /// Backend answered with a non-2xx status
    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    /// Backend answered 2xx with a body we cannot parse
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Stable short name for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::ModelInitialization(_) => "model_initialization",
            GatewayError::Network(_) => "network",
            GatewayError::Timeout { .. } => "timeout",
            GatewayError::Decode(_) => "decode",
            GatewayError::Server { .. } => "server",
            GatewayError::InvalidResponse(_) => "invalid_response",
        }
    }

    pub fn server(status: u16, body: &str) -> Self {
        GatewayError::Server {
            status,
            body: truncate(body, BODY_PREVIEW_CHARS),
        }
    }
}

/// How much of a response body ends up in errors and diagnostics
pub const BODY_PREVIEW_CHARS: usize = 256;

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}

/// Invalid configuration or settings persistence failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Settings IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}
