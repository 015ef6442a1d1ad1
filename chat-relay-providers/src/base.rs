//! Base trait for LLM providers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Connection failures, timeouts and body read errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("API error: HTTP {status}: {body}")]
    ApiError { status: u16, body: String },

    /// The provider answered 2xx but the payload is not what we expect
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProviderError {
    /// Whether the failure happened on the wire rather than in the payload
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::HttpError(_) | Self::ApiError { .. })
    }

    /// Whether the failure is a timeout waiting on the provider
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::HttpError(e) if e.is_timeout())
    }

    /// Upstream HTTP status, when the provider answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// A single-turn generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub message: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            message: message.into(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Text produced by a provider for one request
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: None,
            usage: None,
        }
    }
}

/// Trait for LLM providers
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Issue exactly one generation call. Implementations must not retry.
    async fn generate(&self, request: GenerationRequest) -> ProviderResult<Generation>;

    /// Short provider name, used as the prefix of error messages
    fn name(&self) -> &str;

    /// Name shown by the service's status endpoints
    fn display_name(&self) -> &str {
        self.name()
    }
}
