//! AI Integration Layer
//!
//! Text generation backends used to draft summaries, outlines and prose.

pub mod provider;

pub use provider::{
    LlmProvider, LlmResponse, OllamaProvider, OpenAiProvider, ProviderConfig, ResponseMetadata,
    ResponseTiming, SharedProvider, TokenUsage, create_provider,
};
