//! Unified Error Type System
//!
//! Centralized error type for the whole crate.
//!
//! ## Error Sources
//!
//! - **LlmApi**: the text generation service failed (network, HTTP status, bad payload)
//! - **Export**: the document formatter could not write the artifact
//! - **InvalidRequest**: the front end handed over an unusable report request
//! - **Session**: an operation was invoked in the wrong session state
//!
//! Malformed outlines are deliberately not an error: the parser degrades to a
//! partial tree and reports what it dropped (see `ParsedOutline`).
//!
//! Nothing in this crate retries. Every variant surfaces to the caller of the
//! top-level entry points.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum LongformError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Text Generation Errors
    // -------------------------------------------------------------------------
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Operation timeout with context
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid report request: {0}")]
    InvalidRequest(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Export to {path} failed: {reason}")]
    Export { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, LongformError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl LongformError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create an export error for the given destination
    pub fn export(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Export {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the failure came from the text generation service
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Self::LlmApi(_) | Self::Timeout { .. })
    }
}

// =============================================================================
// Tests
// =============================================================================
