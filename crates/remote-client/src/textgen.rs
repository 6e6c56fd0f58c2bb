//! Text generation over the HuggingFace inference API.
//!
//! Unlike weather and mood, generation errors are returned to the caller.
//! The recommendation engine decides how to degrade.

use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TEXT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/tiiuae/falcon-7b-instruct";

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_new_tokens: u32,
    /// Hard deadline for one generation call.
    pub timeout: Duration,
}

impl Default for DecodingParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_p: 0.9,
            max_new_tokens: 220,
            timeout: Duration::from_secs(20),
        }
    }
}

impl DecodingParams {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`. The returned text never echoes
    /// the prompt.
    async fn generate(&self, prompt: &str, params: &DecodingParams) -> Result<String>;
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
    options: GenerationOptions,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    temperature: f32,
    top_p: f32,
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Debug, Serialize)]
struct GenerationOptions {
    use_cache: bool,
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct Generated {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Many(Vec<Generated>),
    One(Generated),
}

impl GenerationResponse {
    fn into_text(self) -> Option<String> {
        match self {
            GenerationResponse::Many(items) => {
                items.into_iter().next().map(|item| item.generated_text)
            }
            GenerationResponse::One(item) => Some(item.generated_text),
        }
    }
}

/// Remove an echoed prompt from the front of a completion.
pub fn strip_prompt(text: &str, prompt: &str) -> String {
    text.strip_prefix(prompt).unwrap_or(text).trim().to_string()
}

// =============================================================================
// Client
// =============================================================================

#[derive(Debug, Clone)]
pub struct HuggingFaceTextClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HuggingFaceTextClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_TEXT_ENDPOINT.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceTextClient {
    async fn generate(&self, prompt: &str, params: &DecodingParams) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RemoteError::Config("text API key not configured".to_string()))?;

        let request = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                temperature: params.temperature,
                top_p: params.top_p,
                max_new_tokens: params.max_new_tokens,
                return_full_text: false,
            },
            options: GenerationOptions {
                use_cache: false,
                wait_for_model: true,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .timeout(params.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    RemoteError::Timeout(params.timeout)
                } else {
                    RemoteError::Network(err)
                }
            })?;

        if !response.status().is_success() {
            return Err(RemoteError::from_response(response).await);
        }

        let body = response.text().await?;
        let generated: GenerationResponse = serde_json::from_str(&body)?;
        let text = generated
            .into_text()
            .ok_or_else(|| RemoteError::Malformed("empty generation list".to_string()))?;

        debug!("Generated {} characters", text.len());
        Ok(strip_prompt(&text, prompt))
    }
}
