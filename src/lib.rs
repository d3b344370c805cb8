//! Longform - Outline-Driven Long-Form Report Generator
//!
//! Produces long Chinese reports (tens of thousands of characters) from a
//! title, an optional summary and a target length, using a text generation
//! service that can only write a few thousand characters per request.
//!
//! ## Core Features
//!
//! - **Outline Parsing**: Numbered, word-budgeted outlines become a section tree
//! - **Recursive Generation**: Oversized sections are split into sub-outlines
//! - **Progress Streaming**: Status lines broadcast to any listener
//! - **Markdown Export**: Timestamped documents with heading hierarchy
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use longform::{Config, LogSink, MarkdownFormatter, ReportRequest, ReportSession};
//! use longform::ai::{ProviderConfig, create_provider};
//!
//! let config = Config::default();
//! let provider = create_provider(&ProviderConfig::from(&config.llm))?;
//! let mut session = ReportSession::new(provider, Arc::new(LogSink), config.generation.clone());
//!
//! session.start(ReportRequest::new("智慧水务建设方案", 30000)).await?;
//! session.generate().await?;
//! session.export(&MarkdownFormatter::new("report"), &config.output.output_dir)?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: Text generation providers
//! - [`report`]: Outline model, parser, generator, assembler and formatter
//! - [`config`]: Layered configuration
//! - [`cli`]: Command implementations and progress rendering

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod report;
pub mod types;

// Configuration
pub use config::{Config, ConfigLoader, GenerationConfig, LlmConfig, OutputConfig};

// Error Types
pub use types::{LongformError, Result, SessionId};

// Report pipeline
pub use report::{
    AssembledDocument, ContentGenerator, DocumentFormatter, GenerationContext, GenerationStats,
    LogSink, MarkdownFormatter, NullSink, OutlineNode, OutlineParser, ParsedOutline,
    ProgressSink, ProgressUpdate, ReportRequest, ReportSession, SessionState, count_target_chars,
    parse_outline,
};

// Providers
pub use ai::{LlmProvider, LlmResponse, SharedProvider};
