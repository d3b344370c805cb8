//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/longform/) and project (.longform/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{export, generation, network};
use crate::types::{LongformError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Recursive generation settings
    pub generation: GenerationConfig,

    /// Document export settings
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            generation: GenerationConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `LongformError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(LongformError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(LongformError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.generation.part_length == 0 {
            return Err(LongformError::Config(
                "generation.part_length must be greater than 0".to_string(),
            ));
        }

        if self.generation.max_split_depth == 0 {
            return Err(LongformError::Config(
                "generation.max_split_depth must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai" or "ollama"
    pub provider: String,

    /// Model name (empty = provider default)
    pub model: String,

    /// Custom endpoint
    pub api_base: Option<String>,

    /// API key; never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature. Prose benefits from some variety.
    pub temperature: f32,

    /// Maximum tokens per response
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: String::new(),
            api_base: None,
            api_key: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
            max_tokens: network::DEFAULT_MAX_TOKENS,
        }
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Largest leaf budget generated in a single request
    pub part_length: u32,

    /// How many nested sub-outlines one section may go through
    pub max_split_depth: usize,

    /// Title of the synthetic outline root; the report title when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_title: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            part_length: generation::PART_LENGTH,
            max_split_depth: generation::MAX_SPLIT_DEPTH,
            root_title: None,
        }
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory exported reports are written to
    pub output_dir: PathBuf,

    /// File name prefix, followed by a timestamp
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(export::DEFAULT_OUTPUT_DIR),
            file_prefix: export::DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
