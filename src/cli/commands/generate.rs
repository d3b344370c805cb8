//! Generate Command
//!
//! One-shot report generation: request the outline, fill it, export it.
//!
//! Usage:
//!   longform generate --topic <TITLE> --words <N> [--summary <TEXT>] [--output <DIR>]

use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::info;

use super::super::progress::{ConsoleRenderer, MessageLevel, ProgressTracker};
use super::super::ui::Output;
use super::super::util::{CommandContext, LlmOverrides, check_provider};
use crate::report::{MarkdownFormatter, ReportRequest, ReportSession};
use crate::types::{LongformError, Result};

/// Generate run options (consolidated parameters)
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Report title
    pub topic: String,
    /// Total target length in characters
    pub words: u32,
    /// Summary to use instead of requesting one
    pub summary: Option<String>,
    /// Provider, model and output overrides
    pub overrides: LlmOverrides,
}

impl GenerateOptions {
    fn request(&self) -> Result<ReportRequest> {
        if self.topic.trim().is_empty() {
            return Err(LongformError::InvalidRequest("主题不能为空".to_string()));
        }
        if self.words == 0 {
            return Err(LongformError::InvalidRequest("字数必须大于0".to_string()));
        }
        let request = ReportRequest::new(self.topic.trim(), self.words);
        Ok(match &self.summary {
            Some(summary) => request.with_summary(summary),
            None => request,
        })
    }
}

/// Run report generation
pub fn run(options: GenerateOptions) -> Result<()> {
    let request = options.request()?;
    let ctx = CommandContext::load(&options.overrides)?;
    let rt = Runtime::new()?;
    rt.block_on(run_async(ctx, request))
}

async fn run_async(ctx: CommandContext, request: ReportRequest) -> Result<()> {
    let output = Output::new();
    check_provider(&ctx.provider, &output).await;

    let tracker = ProgressTracker::new();
    let render_handle = ConsoleRenderer::new(tracker.clone()).start_render_loop();

    let result = generate_report(&ctx, &tracker, &output, request).await;
    match &result {
        Ok(summary) => tracker.finish(true, summary),
        Err(e) => {
            tracker.message(MessageLevel::Error, &e.to_string());
            tracker.finish(false, "报告生成失败");
        }
    }
    let _ = render_handle.await;

    result.map(|_| ())
}

async fn generate_report(
    ctx: &CommandContext,
    tracker: &ProgressTracker,
    output: &Output,
    request: ReportRequest,
) -> Result<String> {
    let title = request.title.clone();
    let mut session = ReportSession::new(
        ctx.provider.clone(),
        Arc::new(tracker.clone()),
        ctx.config.generation.clone(),
    );

    let leaves = {
        let outline = session.start(request).await?;
        if outline.is_empty() {
            return Err(LongformError::Session(
                "outline contained no recognisable sections".to_string(),
            ));
        }
        outline.root.leaves().len()
    };

    output.section("摘要");
    println!("{}", session.summary());
    output.section("大纲");
    println!("{}", session.outline_text().trim());
    if let Some(outline) = session.outline()
        && outline.has_orphans()
    {
        output.warning(&format!(
            "{} sections have no parent in the outline and were skipped",
            outline.orphans.len()
        ));
    }

    tracker.start(&title, leaves);
    let stats = session.generate().await?;
    tracker.end_run();

    let formatter = MarkdownFormatter::new(&ctx.config.output.file_prefix);
    let exported = session.export(&formatter, &ctx.config.output.output_dir)?;
    info!(
        "Report {} exported: {} requests, {} input / {} output tokens",
        session.id(),
        stats.llm_calls,
        stats.input_tokens,
        stats.output_tokens
    );

    Ok(format!(
        "报告生成完成！已导出到文件：{} (共 {} 字)",
        exported.path.display(),
        stats.target_chars
    ))
}
