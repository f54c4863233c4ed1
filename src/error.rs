//! Error types for the Planwright generation pipeline.

use crate::generation::validate::ValidationReport;
use std::time::Duration;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Failed to encode value for {key}: {message}")]
    Encode { key: String, message: String },

    #[error("Failed to decode value for {key}: {message}")]
    Decode { key: String, message: String },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("sled: {}", err),
        ))
    }
}

/// Failure of a single upstream HTTP exchange with a model provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Provider authentication failed: {0}")]
    Auth(String),

    #[error("Provider rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Provider request timed out: {0}")]
    Timeout(String),

    #[error("Provider connection failed: {0}")]
    Connection(String),

    #[error("Provider returned status {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Provider model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider request failed: {0}")]
    Request(String),

    #[error("Provider response malformed: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether retrying the same request shortly after may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Connection(_) => true,
            ProviderError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Text Repair exhausted every recovery strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not recover a JSON document from model output: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Why a single strategy attempt failed.
///
/// Every variant is absorbed by the orchestrator; none reaches the caller of
/// `generate`.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Upstream call exceeded its {0:?} deadline")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(ProviderError),

    #[error("Upstream signalled rate limiting: {0}")]
    RateLimit(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Candidate failed validation: {0}")]
    Validation(ValidationReport),
}

impl GenerationError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, GenerationError::RateLimit(_))
    }

    /// Stable label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Timeout(_) => "timeout",
            GenerationError::Transport(_) => "transport",
            GenerationError::RateLimit(_) => "rate_limit",
            GenerationError::Parse(_) => "parse",
            GenerationError::Validation(_) => "validation",
        }
    }
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited(message) => GenerationError::RateLimit(message),
            other => GenerationError::Transport(other),
        }
    }
}

/// Errors surfaced by configuration, storage and provider setup.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Plan failed validation: {0}")]
    InvalidPlan(ValidationReport),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
