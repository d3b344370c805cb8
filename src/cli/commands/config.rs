//! Config Command
//!
//! Manage longform configuration.
//!
//! Usage:
//!   longform config show [-f json]
//!   longform config path
//!   longform config init [-g] [--force]

use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(format: &str) -> Result<()> {
    ConfigLoader::show_config(format == "json")
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Initialize global configuration
pub fn init_global(force: bool) -> Result<()> {
    let dir = ConfigLoader::init_global(force)?;
    println!("✓ Initialized global configuration");
    println!("  Directory: {}", dir.display());
    if let Some(config_path) = ConfigLoader::global_config_path() {
        println!("  Config:    {}", config_path.display());
    }
    Ok(())
}

/// Initialize project configuration in the current directory
pub fn init_project() -> Result<()> {
    let root = std::env::current_dir()?;
    let dir = ConfigLoader::init_project(&root)?;
    println!("✓ Initialized project configuration");
    println!("  Directory: {}", dir.display());
    println!("  Config:    {}", dir.join("config.toml").display());
    Ok(())
}
