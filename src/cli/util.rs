//! CLI Common Utilities
//!
//! Shared configuration and provider setup for CLI commands.

use std::path::PathBuf;

use tracing::{debug, warn};

use super::ui::Output;
use crate::ai::provider::{ProviderConfig, SharedProvider, create_provider};
use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Command-line overrides applied on top of the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct LlmOverrides {
    /// LLM provider (openai, ollama)
    pub provider: Option<String>,
    /// Model name
    pub model: Option<String>,
    /// Output directory for exported reports
    pub output: Option<PathBuf>,
}

impl LlmOverrides {
    /// Apply overrides to a loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(output) = &self.output {
            config.output.output_dir = output.clone();
        }
    }
}

/// Command execution context
///
/// Configuration with CLI overrides applied, plus the text generation
/// provider built from it.
#[derive(Clone)]
pub struct CommandContext {
    pub config: Config,
    pub provider: SharedProvider,
}

impl CommandContext {
    /// Load configuration, apply overrides and create the provider
    pub fn load(overrides: &LlmOverrides) -> Result<Self> {
        let mut config = ConfigLoader::load()?;
        overrides.apply(&mut config);
        config.validate()?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let provider = create_provider(&ProviderConfig::from(&config.llm))?;
        debug!(
            "Using provider {} (model: {})",
            provider.name(),
            provider.model()
        );
        Ok(Self { config, provider })
    }
}

/// Pre-flight provider check before a run
///
/// An unhealthy or unreachable provider is reported but does not stop the
/// run; the first real request surfaces the actual error.
pub async fn check_provider(provider: &SharedProvider, output: &Output) -> bool {
    match provider.health_check().await {
        Ok(true) => {
            output.success(&format!(
                "Provider '{}' is healthy (model: {})",
                provider.name(),
                provider.model()
            ));
            true
        }
        Ok(false) => {
            warn!("Provider '{}' health check inconclusive", provider.name());
            output.warning(&format!(
                "Provider '{}' health check inconclusive",
                provider.name()
            ));
            false
        }
        Err(e) => {
            warn!("Provider '{}' health check failed: {}", provider.name(), e);
            output.warning(&format!(
                "Provider '{}' health check failed: {}",
                provider.name(),
                e
            ));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_support::ScriptedProvider;
    use std::sync::Arc;

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        let overrides = LlmOverrides {
            provider: Some("ollama".to_string()),
            model: Some("qwen2".to_string()),
            output: Some(PathBuf::from("reports")),
        };
        overrides.apply(&mut config);

        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model, "qwen2");
        assert_eq!(config.output.output_dir, PathBuf::from("reports"));
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let mut config = Config::default();
        LlmOverrides::default().apply(&mut config);
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.output.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_context_from_config() {
        let mut config = Config::default();
        config.llm.provider = "ollama".to_string();
        let ctx = CommandContext::from_config(config).unwrap();
        assert_eq!(ctx.provider.name(), "ollama");
    }

    #[tokio::test]
    async fn test_check_provider_reports_health() {
        let output = Output::new();
        let healthy: SharedProvider = Arc::new(ScriptedProvider::new());
        assert!(check_provider(&healthy, &output).await);

        let unhealthy: SharedProvider = Arc::new(ScriptedProvider::new().unhealthy());
        assert!(!check_provider(&unhealthy, &output).await);
    }
}
