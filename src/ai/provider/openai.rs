//! OpenAI API Provider
//!
//! LLM provider using the Chat Completions API of OpenAI or any
//! OpenAI-compatible endpoint. Returns plain prose with token usage.
//!
//! Credentials resolve in order: config `api_key`, `OPENAI_API_KEY`, then the
//! first entry of the `OAI_CONFIG_LIST` JSON list.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming, TokenUsage,
};
use crate::types::{LongformError, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const CONFIG_LIST_ENV: &str = "OAI_CONFIG_LIST";
const SYSTEM_PROMPT: &str = "你是一名专业的中文报告撰写专家，按照要求输出内容，不要添加额外解释。";

/// OpenAI API Provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// One entry of the `OAI_CONFIG_LIST` environment variable
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigListEntry {
    model: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
}

/// Parse the first entry of an `OAI_CONFIG_LIST` value
fn parse_config_list(raw: &str) -> Result<ConfigListEntry> {
    let entries: Vec<ConfigListEntry> = serde_json::from_str(raw).map_err(|e| {
        LongformError::Config(format!("Invalid {} format: {}", CONFIG_LIST_ENV, e))
    })?;
    entries
        .into_iter()
        .next()
        .ok_or_else(|| LongformError::Config(format!("{} is an empty list", CONFIG_LIST_ENV)))
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let listed = match std::env::var(CONFIG_LIST_ENV) {
            Ok(raw) => parse_config_list(&raw)?,
            Err(_) => ConfigListEntry::default(),
        };

        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .or(listed.api_key)
            .ok_or_else(|| {
                LongformError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY or OAI_CONFIG_LIST, or provide it in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .or(listed.base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = api_base.trim_end_matches('/').to_string();

        let model = config
            .model
            .or(listed.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LongformError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout,
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        info!(
            "Generating with OpenAI (model: {}, temperature: {})",
            self.model, self.temperature
        );

        let start_time = Instant::now();
        let request = self.build_request(prompt);
        let url = format!("{}/chat/completions", self.api_base);

        debug!("Sending request to OpenAI API");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LongformError::timeout("OpenAI request", self.timeout)
                } else {
                    LongformError::LlmApi(format!("OpenAI request failed: {}", e))
                }
            })?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LongformError::LlmApi(format!(
                "OpenAI API error ({}): {}",
                status, body
            )));
        }

        let response_body: ChatCompletionResponse = response.json().await.map_err(|e| {
            LongformError::LlmApi(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let usage = response_body
            .usage
            .map(|u| TokenUsage::from_openai(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let content = response_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LongformError::LlmApi("No content in OpenAI response".to_string()))?;

        debug!(chars = content.chars().count(), "Received response from OpenAI");

        Ok(LlmResponse::with_metrics(
            content,
            usage,
            ResponseTiming::from_duration(elapsed),
            ResponseMetadata {
                model: self.model.clone(),
                provider: "openai".to_string(),
            },
        ))
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.api_base);

        let response = self
            .client
            .get(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("OpenAI API is available");
                Ok(true)
            }
            Ok(resp) => {
                warn!("OpenAI API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("OpenAI API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}
