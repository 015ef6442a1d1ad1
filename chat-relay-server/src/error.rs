//! Failures of a chat exchange and their HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chat_relay_providers::ProviderError;
use serde::Serialize;
use thiserror::Error;

/// Why a chat exchange did not produce a reply.
///
/// None of these leave anything behind in the session store.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The client request was malformed or incomplete
    #[error("{0}")]
    Validation(String),

    /// Network failure, timeout or non-success provider status
    #[error("{message}")]
    Transport {
        message: String,
        status: Option<u16>,
        details: Option<String>,
    },

    /// The provider answered successfully with an unusable payload
    #[error("{message}")]
    Schema {
        message: String,
        details: Option<String>,
    },

    /// Anything else
    #[error("Server error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Translate a provider failure, naming the provider in the message
    pub fn from_provider(err: ProviderError, provider: &str) -> Self {
        if err.is_timeout() {
            return Self::Transport {
                message: format!("Network error: {} did not answer in time", provider),
                status: None,
                details: None,
            };
        }

        let status = err.status();
        match err {
            ProviderError::ApiError { body, .. } => Self::Transport {
                message: format!(
                    "{} API Error: {}",
                    provider,
                    status.map_or_else(|| "unknown".to_string(), |s| s.to_string())
                ),
                status,
                details: Some(body),
            },
            ProviderError::HttpError(e) => Self::Transport {
                message: format!("Network error: {}", e),
                status,
                details: None,
            },
            ProviderError::InvalidResponse(reason) => Self::Schema {
                message: format!("No response from {} API", provider),
                details: Some(reason),
            },
            ProviderError::ConfigError(reason) => Self::Internal(reason),
        }
    }

    /// HTTP status used when this error reaches a client
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Transport {
                status: Some(status),
                ..
            } => StatusCode::from_u16(*status)
                .ok()
                .filter(|code| code.is_client_error() || code.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Self::Transport { status: None, .. } | Self::Schema { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn details(&self) -> Option<&str> {
        match self {
            Self::Transport { details, .. } | Self::Schema { details, .. } => details.as_deref(),
            Self::Validation(_) | Self::Internal(_) => None,
        }
    }
}

/// JSON error envelope returned by every API route
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Chat exchange failed: {}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "Chat exchange rejected: {}", self);
        }

        let body = ErrorBody {
            error: self.to_string(),
            details: self.details().map(ToString::to_string),
        };
        (status, Json(body)).into_response()
    }
}
