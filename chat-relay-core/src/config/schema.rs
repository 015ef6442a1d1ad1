//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for chat-relay
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Provider configuration
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Default generation parameters for chat requests
    #[serde(default)]
    pub chat: ChatDefaults,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Listening port (overridable with `PORT`)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served for non-API paths
    #[serde(default)]
    pub static_dir: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Google Gemini provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header
    #[serde(default)]
    pub api_key: String,
    /// Base URL up to and including the API version
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Supported model identifiers, in display order
    #[serde(default = "default_gemini_models")]
    pub models: Vec<String>,
    /// Model used when a request names none or an unsupported one
    #[serde(default = "default_gemini_model")]
    pub default_model: String,
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_gemini_models() -> Vec<String> {
    vec![
        "gemini-1.5-flash".to_string(),
        "gemini-pro".to_string(),
        "gemini-pro-vision".to_string(),
    ]
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

impl GeminiConfig {
    /// Whether an API key has been configured
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_gemini_api_base(),
            timeout_secs: default_timeout_secs(),
            models: default_gemini_models(),
            default_model: default_gemini_model(),
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("models", &self.models)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Default generation parameters applied when a request omits them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatDefaults {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

impl Default for ChatDefaults {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}
