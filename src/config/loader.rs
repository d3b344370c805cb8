//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/longform/config.toml)
//! 3. Project config (.longform/config.toml)
//! 4. Environment variables (LONGFORM_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{LongformError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // LONGFORM_LLM_MODEL -> llm.model
        figment = figment.merge(Env::prefixed("LONGFORM_").split('_').lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| LongformError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| LongformError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/longform/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("longform"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".longform/config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".longform")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| LongformError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            LongformError::Config("Cannot determine global config directory".to_string())
        })?;

        fs::create_dir_all(&global_dir)?;

        let config_path = global_dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_global_config())?;
            info!("Created global config: {}", config_path.display());
        } else {
            info!("Global config exists: {}", config_path.display());
        }

        Ok(global_dir)
    }

    /// Initialize project configuration under `root`
    pub fn init_project(root: &Path) -> Result<PathBuf> {
        let project_dir = root.join(Self::project_dir());
        fs::create_dir_all(&project_dir)?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, Self::default_project_config())?;
            info!("Created project config: {}", config_path.display());
        }

        Ok(project_dir)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Generate default global config content (TOML)
    fn default_global_config() -> String {
        r#"# Longform Global Configuration
# User-wide defaults. Project settings in .longform/config.toml override these.

version = "1.0"

# Text generation backend
[llm]
provider = "openai"
model = "gpt-3.5-turbo"
timeout_secs = 300
temperature = 0.7
"#
        .to_string()
    }

    /// Generate default project config content (TOML)
    fn default_project_config() -> String {
        r#"# Longform Project Configuration
# Project-specific settings that override global defaults.

version = "1.0"

# Recursive generation
[generation]
part_length = 1000
max_split_depth = 3
# Root of the main outline; defaults to the report title
# root_title = "报告正文"

# Exported documents
[output]
output_dir = "output"
file_prefix = "report"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[generation]\npart_length = 800\n\n[llm]\nprovider = \"ollama\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.generation.part_length, 800);
        assert_eq!(config.llm.provider, "ollama");
        // untouched sections keep their defaults
        assert_eq!(config.generation.max_split_depth, 3);
        assert_eq!(config.output.file_prefix, "report");
    }

    #[test]
    fn test_load_from_file_validates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[generation]\npart_length = 0\n").unwrap();

        let result = ConfigLoader::load_from_file(&path);
        assert!(matches!(result, Err(LongformError::Config(_))));
    }

    #[test]
    fn test_init_project() {
        let temp_dir = TempDir::new().unwrap();

        let dir = ConfigLoader::init_project(temp_dir.path()).unwrap();

        assert!(dir.exists());
        let config_path = dir.join("config.toml");
        assert!(config_path.exists());
        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert!(config.generation.root_title.is_none());
    }

    #[test]
    fn test_default_global_config_parses() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, ConfigLoader::default_global_config()).unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
    }
}
