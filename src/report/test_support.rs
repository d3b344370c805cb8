//! Test doubles for the text generation service and the progress sink

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::progress::ProgressSink;
use super::prompts::{OUTLINE_MARKER, SECTION_MARKER, SUB_OUTLINE_MARKER, SUMMARY_MARKER};
use crate::ai::provider::{LlmProvider, LlmResponse, ResponseMetadata, ResponseTiming, TokenUsage};
use crate::types::{LongformError, Result};

pub const SAMPLE_OUTLINE: &str = "# 报告大纲\n\n1. 引言 (800字)\n    1.1 背景 (400字)\n    1.2 意义 (400字)\n2. 结论 (600字)\n";

/// Answers each request kind with canned text and records every prompt
pub struct ScriptedProvider {
    prompts: Mutex<Vec<String>>,
    summary: String,
    outlines: Mutex<Vec<String>>,
    sub_outlines: HashMap<String, String>,
    default_sub_outline: String,
    fail_on: Option<String>,
    healthy: bool,
}

impl ScriptedProvider {
    pub const INPUT_TOKENS: u32 = 10;
    pub const OUTPUT_TOKENS: u32 = 20;
    pub const LATENCY_MS: u64 = 5;

    pub fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            summary: "本报告概述了项目的主要内容和价值。".to_string(),
            outlines: Mutex::new(vec![SAMPLE_OUTLINE.to_string()]),
            sub_outlines: HashMap::new(),
            default_sub_outline: "1. 第一部分 (500字)\n2. 第二部分 (500字)".to_string(),
            fail_on: None,
            healthy: true,
        }
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    /// Outline responses served in order; the last one repeats
    pub fn with_outlines(self, outlines: &[&str]) -> Self {
        *self.outlines.lock().unwrap() = outlines.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn with_sub_outline(mut self, section: &str, outline: &str) -> Self {
        self.sub_outlines
            .insert(section.to_string(), outline.to_string());
        self
    }

    pub fn with_default_sub_outline(mut self, outline: &str) -> Self {
        self.default_sub_outline = outline.to_string();
        self
    }

    /// Fail any request whose prompt contains `needle`
    pub fn fail_when(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    /// Report the service as unavailable to health checks
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn section_text(title: &str) -> String {
        format!("这是关于{}的正文段落。", title)
    }

    /// Value of the first `prefix<value>` line in a prompt
    pub fn extract(prompt: &str, prefix: &str) -> Option<String> {
        prompt
            .lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix(prefix))
            .map(|value| value.trim().to_string())
    }

    fn answer(&self, prompt: &str) -> String {
        if prompt.contains(SUB_OUTLINE_MARKER) {
            let section = Self::extract(prompt, "当前部分标题：").unwrap_or_default();
            return self
                .sub_outlines
                .get(&section)
                .cloned()
                .unwrap_or_else(|| self.default_sub_outline.clone());
        }
        if prompt.contains(SECTION_MARKER) {
            let section = Self::extract(prompt, "当前部分：").unwrap_or_default();
            return Self::section_text(&section);
        }
        if prompt.contains(SUMMARY_MARKER) {
            return self.summary.clone();
        }
        if prompt.contains(OUTLINE_MARKER) {
            let mut outlines = self.outlines.lock().unwrap();
            return if outlines.len() > 1 {
                outlines.remove(0)
            } else {
                outlines.first().cloned().unwrap_or_default()
            };
        }
        String::new()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(needle) = &self.fail_on
            && prompt.contains(needle.as_str())
        {
            return Err(LongformError::LlmApi("scripted failure".to_string()));
        }

        Ok(LlmResponse::with_metrics(
            self.answer(prompt),
            TokenUsage {
                input_tokens: Self::INPUT_TOKENS,
                output_tokens: Self::OUTPUT_TOKENS,
            },
            ResponseTiming {
                total_ms: Self::LATENCY_MS,
            },
            ResponseMetadata {
                model: "scripted".to_string(),
                provider: "scripted".to_string(),
            },
        ))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.healthy)
    }
}

/// Sink that keeps every message
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
