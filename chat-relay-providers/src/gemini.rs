//! Google Gemini `generateContent` client

use async_trait::async_trait;
use chat_relay_core::config::GeminiConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::base::{
    ChatProvider, Generation, GenerationRequest, ProviderError, ProviderResult, Usage,
};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API request format
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    #[serde(default)]
    total_token_count: u64,
}

/// Gemini provider client
pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client from the provider configuration.
    ///
    /// The HTTP client carries the configured timeout for every call.
    pub fn new(config: &GeminiConfig) -> ProviderResult<Self> {
        let api_base = config.api_base.trim().trim_end_matches('/').to_string();
        if api_base.is_empty() {
            return Err(ProviderError::ConfigError(
                "providers.gemini.api_base is empty".to_string(),
            ));
        }
        if !config.has_api_key() {
            warn!("No Gemini API key configured, provider calls will be rejected upstream");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base,
            api_key: config.api_key.clone(),
        })
    }

    /// URL of the `generateContent` method for a model
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }

    fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: request.message.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }

    /// Pull `candidates[0].content.parts[0].text` out of a raw response body
    fn parse_response(body: &str) -> ProviderResult<Generation> {
        let response: GenerateContentResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::InvalidResponse(format!("malformed JSON: {}", e)))?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No candidates in response".to_string()))?;

        let text = candidate
            .content
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| {
                ProviderError::InvalidResponse(format!(
                    "First candidate has no text part (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ))
            })?;

        Ok(Generation {
            text,
            finish_reason: candidate.finish_reason,
            usage: response.usage_metadata.map(|u| Usage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
        })
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl ChatProvider for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> ProviderResult<Generation> {
        let body = Self::build_request(&request);
        let url = self.endpoint(&request.model);

        debug!(
            model = %request.model,
            temperature = request.temperature,
            max_output_tokens = request.max_tokens,
            "Sending generateContent request to {}",
            url
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "Gemini API responded");

        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                body: text,
            });
        }

        Self::parse_response(&text)
    }

    fn name(&self) -> &str {
        "Gemini"
    }

    fn display_name(&self) -> &str {
        "Google Gemini"
    }
}
