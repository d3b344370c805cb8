//! Ollama Local LLM Provider
//!
//! LLM provider for locally-running Ollama models. Requests are
//! non-streaming and return the raw generated text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming, TokenUsage,
};
use crate::types::{LongformError, Result};

const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama2";

/// Ollama Local LLM Provider
pub struct OllamaProvider {
    api_base: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let api_base = Self::validate_endpoint(&api_base)?;

        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LongformError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base,
            model,
            temperature: config.temperature,
            timeout,
            client,
        })
    }

    /// Validate endpoint URL (SSRF prevention)
    ///
    /// Only allows http/https schemes and warns for non-localhost endpoints.
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            LongformError::Config(format!("Invalid Ollama endpoint URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(LongformError::Config(format!(
                "Ollama endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "[::1]")
        {
            warn!(
                "Ollama endpoint is not localhost: {}. Ensure this is intentional.",
                host
            );
        }

        let mut result = url.to_string();
        if result.ends_with('/') {
            result.pop();
        }
        Ok(result)
    }

    fn build_request(&self, prompt: &str) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: Some(OllamaOptions {
                temperature: self.temperature,
            }),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        info!(
            "Generating with Ollama (model: {}, temperature: {})",
            self.model, self.temperature
        );

        let start_time = Instant::now();
        let request = self.build_request(prompt);
        let url = format!("{}/api/generate", self.api_base);

        debug!("Sending request to Ollama API");

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LongformError::timeout("Ollama request", self.timeout)
                } else if e.is_connect() {
                    LongformError::LlmApi(format!(
                        "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                        self.api_base
                    ))
                } else {
                    LongformError::LlmApi(format!("Ollama request failed: {}", e))
                }
            })?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LongformError::LlmApi(format!(
                "Ollama API error ({}): {}",
                status, body
            )));
        }

        let response_body: OllamaResponse = response.json().await.map_err(|e| {
            LongformError::LlmApi(format!("Failed to parse Ollama response: {}", e))
        })?;

        let usage = TokenUsage::from_ollama(
            response_body.prompt_eval_count.unwrap_or(0),
            response_body.eval_count.unwrap_or(0),
        );

        Ok(LlmResponse::with_metrics(
            response_body.response,
            usage,
            ResponseTiming::from_duration(elapsed),
            ResponseMetadata {
                model: self.model.clone(),
                provider: "ollama".to_string(),
            },
        ))
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.api_base);

        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let Ok(tags) = resp.json::<OllamaTagsResponse>().await else {
                    info!("Ollama is available");
                    return Ok(true);
                };
                let base = self.model.trim_end_matches(":latest");
                if tags.models.iter().any(|m| m.name == self.model || m.name.starts_with(base)) {
                    info!("Ollama is available with model: {}", self.model);
                    Ok(true)
                } else {
                    warn!(
                        "Ollama is running but model '{}' not found. Pull with: ollama pull {}",
                        self.model, self.model
                    );
                    Ok(false)
                }
            }
            Ok(resp) => {
                warn!("Ollama API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Ollama not available: {}. Start with: ollama serve", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}
