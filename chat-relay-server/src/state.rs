use chat_relay_core::config::Config;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::gateway::ChatGateway;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ChatGateway>,
    /// Static facts reported by the diagnostic endpoint
    pub info: Arc<ServiceInfo>,
}

impl AppState {
    pub fn new(gateway: ChatGateway, info: ServiceInfo) -> Self {
        Self {
            gateway: Arc::new(gateway),
            info: Arc::new(info),
        }
    }
}

/// Non-secret facts about the running service
#[derive(Debug, Clone, Default)]
pub struct ServiceInfo {
    pub api_base: String,
    pub api_key_set: bool,
}

impl ServiceInfo {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_base: config.providers.gemini.api_base.clone(),
            api_key_set: config.providers.gemini.has_api_key(),
        }
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<chat_relay_core::models::ModelDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<chat_relay_core::session::ChatTurn>,
}
