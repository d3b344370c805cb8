//! Recursive content generator
//!
//! Fills in `content` for every node of an outline in one depth-first pass:
//!
//! - internal node: generate children in order, join with a blank line
//! - leaf within `part_length`: one direct request
//! - leaf over `part_length`: request a sub-outline for it, then run the same
//!   procedure over the sub-outline, joining with newlines
//!
//! Siblings are generated strictly in order and children always finish before
//! their parent. Service failures propagate immediately; content already
//! written into earlier siblings stays in the tree.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::outline::OutlineNode;
use super::parser::{OutlineParser, ParsedOutline};
use super::progress::{ProgressSink, ProgressUpdate};
use super::prompts::{SectionPrompt, SubOutlinePrompt};
use super::word_count::count_target_chars;
use crate::ai::provider::{LlmResponse, SharedProvider};
use crate::config::GenerationConfig;
use crate::constants::generation::{SECTION_SEPARATOR, SUBSECTION_SEPARATOR};
use crate::types::Result;

/// Report-wide context shared by every request of one run
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub title: String,
    pub summary: String,
    /// Main outline with word annotations and hierarchical indentation
    pub full_outline: String,
    /// Main outline in compact `- ` form
    pub simple_outline: String,
}

impl GenerationContext {
    pub fn new(title: impl Into<String>, summary: impl Into<String>, outline: &OutlineNode) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            full_outline: outline.to_text(true, ""),
            simple_outline: outline.to_simple_text(),
        }
    }
}

/// Counters for one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    /// Requests sent to the text generation service
    pub llm_calls: usize,
    /// Sub-outline requests among them
    pub sub_outlines: usize,
    /// Direct prose requests among them
    pub sections_generated: usize,
    /// Target-script characters in all generated prose
    pub target_chars: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Wall-clock time spent waiting on the service
    pub service_ms: u64,
}

/// Section currently being generated
struct SectionSpec<'a> {
    title: &'a str,
    words: u32,
    level: usize,
    /// Outline of the enclosing sub-outline, if any
    section_outline: Option<&'a str>,
}

/// Depth-first outline expander
pub struct ContentGenerator {
    provider: SharedProvider,
    sink: Arc<dyn ProgressSink>,
    part_length: u32,
    max_split_depth: usize,
    stats: GenerationStats,
}

impl ContentGenerator {
    pub fn new(
        provider: SharedProvider,
        sink: Arc<dyn ProgressSink>,
        config: &GenerationConfig,
    ) -> Self {
        Self {
            provider,
            sink,
            part_length: config.part_length,
            max_split_depth: config.max_split_depth,
            stats: GenerationStats::default(),
        }
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// Generate content for every node below `root`. The document body ends up
    /// in `root.content`.
    #[instrument(skip_all, fields(title = %context.title, sections = root.children.len()))]
    pub async fn generate(
        &mut self,
        context: &GenerationContext,
        root: &mut OutlineNode,
    ) -> Result<GenerationStats> {
        self.stats = GenerationStats::default();
        info!(
            "Generating report body ({} leaf sections, part length {})",
            root.leaves().len(),
            self.part_length
        );

        self.generate_node(context, root).await?;

        info!(
            "Generation finished: {} requests, {} characters, {}ms waiting on the service",
            self.stats.llm_calls, self.stats.target_chars, self.stats.service_ms
        );
        Ok(self.stats.clone())
    }

    /// Main-outline pass
    fn generate_node<'a>(
        &'a mut self,
        ctx: &'a GenerationContext,
        node: &'a mut OutlineNode,
    ) -> BoxFuture<'a, Result<String>> {
        async move {
            if !node.is_leaf() {
                let mut parts = Vec::with_capacity(node.children.len());
                for child in node.children.iter_mut() {
                    parts.push(self.generate_node(ctx, child).await?);
                }
                node.content = parts.join(SECTION_SEPARATOR);
                return Ok(node.content.clone());
            }

            self.sink.update(ProgressUpdate::SectionStarted {
                title: node.title.clone(),
            });
            let spec = SectionSpec {
                title: &node.title,
                words: node.words,
                level: node.level,
                section_outline: None,
            };
            let content = self.generate_section(ctx, spec, 0).await?;
            node.content = content;
            Ok(node.content.clone())
        }
        .boxed()
    }

    /// Produce prose for one leaf section, splitting it when over budget
    fn generate_section<'a>(
        &'a mut self,
        ctx: &'a GenerationContext,
        spec: SectionSpec<'a>,
        depth: usize,
    ) -> BoxFuture<'a, Result<String>> {
        async move {
            if spec.words <= self.part_length {
                return self.request_section(ctx, &spec).await;
            }

            if depth >= self.max_split_depth {
                warn!(
                    "Section '{}' ({}字) still exceeds {} at split depth {}; generating directly",
                    spec.title, spec.words, self.part_length, depth
                );
                return self.request_section(ctx, &spec).await;
            }

            let parsed = self.request_sub_outline(ctx, &spec).await?;
            if parsed.is_empty() {
                warn!(
                    "Sub-outline for '{}' contained no sections; generating directly",
                    spec.title
                );
                return self.request_section(ctx, &spec).await;
            }

            let mut sub_root = parsed.root;
            let outline_text = sub_root.to_text(true, "");
            self.expand_sub_outline(ctx, &mut sub_root, &outline_text, depth + 1)
                .await
        }
        .boxed()
    }

    /// Sub-outline pass; reports each finished child
    fn expand_sub_outline<'a>(
        &'a mut self,
        ctx: &'a GenerationContext,
        node: &'a mut OutlineNode,
        outline_text: &'a str,
        depth: usize,
    ) -> BoxFuture<'a, Result<String>> {
        async move {
            if node.is_leaf() {
                let spec = SectionSpec {
                    title: &node.title,
                    words: node.words,
                    level: node.level,
                    section_outline: Some(outline_text),
                };
                let content = self.generate_section(ctx, spec, depth).await?;
                node.content = content;
                return Ok(node.content.clone());
            }

            let mut parts = Vec::with_capacity(node.children.len());
            for child in node.children.iter_mut() {
                let content = self
                    .expand_sub_outline(ctx, child, outline_text, depth)
                    .await?;
                self.sink.update(ProgressUpdate::SubsectionDone {
                    title: child.title.clone(),
                    chars: count_target_chars(&content),
                });
                parts.push(content);
            }
            node.content = parts.join(SUBSECTION_SEPARATOR);
            Ok(node.content.clone())
        }
        .boxed()
    }

    async fn request_section(
        &mut self,
        ctx: &GenerationContext,
        spec: &SectionSpec<'_>,
    ) -> Result<String> {
        let prompt = SectionPrompt {
            title: &ctx.title,
            summary: &ctx.summary,
            section_title: spec.title,
            target_words: spec.words,
            level: spec.level,
            full_outline: &ctx.full_outline,
            section_outline: spec.section_outline,
        }
        .build();

        let response = self.call(&prompt).await?;
        let chars = count_target_chars(&response.content);
        self.stats.sections_generated += 1;
        self.stats.target_chars += chars;
        debug!(
            "Section '{}' generated: {} of {} target characters",
            spec.title, chars, spec.words
        );
        Ok(response.content)
    }

    async fn request_sub_outline(
        &mut self,
        ctx: &GenerationContext,
        spec: &SectionSpec<'_>,
    ) -> Result<ParsedOutline> {
        info!(
            "Splitting section '{}' ({}字) into a sub-outline",
            spec.title, spec.words
        );
        let prompt = SubOutlinePrompt {
            title: &ctx.title,
            full_outline: &ctx.simple_outline,
            section_title: spec.title,
            target_words: spec.words,
            max_length: self.part_length,
        }
        .build();

        let response = self.call(&prompt).await?;
        self.stats.sub_outlines += 1;
        Ok(OutlineParser::new(spec.title).parse(&response.content))
    }

    async fn call(&mut self, prompt: &str) -> Result<LlmResponse> {
        debug!(
            "Sending request to {} ({} chars)",
            self.provider.name(),
            prompt.chars().count()
        );
        let response = self.provider.generate(prompt).await?;
        debug!(
            "{}/{} answered in {}ms ({} tokens)",
            response.metadata.provider,
            response.metadata.model,
            response.timing.total_ms,
            response.usage.total()
        );
        self.stats.llm_calls += 1;
        self.stats.input_tokens += u64::from(response.usage.input_tokens);
        self.stats.output_tokens += u64::from(response.usage.output_tokens);
        self.stats.service_ms += response.timing.total_ms;
        Ok(response)
    }
}
