//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait: the text generation service the report
//! generator talks to. A provider takes a natural-language instruction and
//! returns generated prose together with usage metrics.
//!
//! Providers never retry. A failed request surfaces as
//! `LongformError::LlmApi` and aborts the run that issued it.

mod ollama;
mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::constants::network as net_constants;
use crate::types::{LongformError, Result};

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Complete LLM response including generated text and usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text, verbatim
    pub content: String,
    /// Token usage metrics
    pub usage: TokenUsage,
    /// Response timing
    pub timing: ResponseTiming,
    /// Provider and model info
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Create full response with all metrics
    pub fn with_metrics(
        content: String,
        usage: TokenUsage,
        timing: ResponseTiming,
        metadata: ResponseMetadata,
    ) -> Self {
        Self {
            content,
            usage,
            timing,
            metadata,
        }
    }
}

/// Token usage metrics
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    /// Input tokens (prompt)
    pub input_tokens: u32,
    /// Output tokens (response)
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }

    /// Create from OpenAI-style usage response
    pub fn from_openai(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            input_tokens: prompt_tokens,
            output_tokens: completion_tokens,
        }
    }

    /// Create from Ollama-style usage response
    pub fn from_ollama(prompt_eval_count: u32, eval_count: u32) -> Self {
        Self {
            input_tokens: prompt_eval_count,
            output_tokens: eval_count,
        }
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Total response time in milliseconds (wall clock)
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    /// Model used
    pub model: String,
    /// Provider name
    pub provider: String,
}

/// Shared LLM provider handle, owned by one report session at a time.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers
///
/// API keys are never serialized and are redacted in debug output. Each
/// provider converts the key to `SecretString` internally.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "openai", "ollama"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
    /// API key (OpenAI-compatible endpoints)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base: Option<String>,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn default_max_tokens() -> usize {
    net_constants::DEFAULT_MAX_TOKENS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            timeout_secs: net_constants::DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
            api_key: None,
            api_base: None,
            max_tokens: net_constants::DEFAULT_MAX_TOKENS,
        }
    }
}

impl From<&LlmConfig> for ProviderConfig {
    fn from(llm: &LlmConfig) -> Self {
        Self {
            provider: llm.provider.clone(),
            model: Some(llm.model.clone()).filter(|m| !m.is_empty()),
            timeout_secs: llm.timeout_secs,
            temperature: llm.temperature,
            api_key: llm.api_key.clone(),
            api_base: llm.api_base.clone(),
            max_tokens: llm.max_tokens,
        }
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// Text generation service: instruction in, prose out
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for a natural-language instruction
    async fn generate(&self, prompt: &str) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is available
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        _ => Err(LongformError::Config(format!(
            "Unknown provider: {}. Supported: openai, ollama",
            config.provider
        ))),
    }
}
