//! Outline Command
//!
//! Request and print an outline without generating the report body.
//!
//! Usage:
//!   longform outline <TITLE> <WORDS> [--summary <TEXT>] [-f text|json]

use std::sync::Arc;

use tokio::runtime::Runtime;

use super::super::ui::Output;
use super::super::util::{CommandContext, LlmOverrides};
use crate::report::{LogSink, ParsedOutline, ReportRequest, ReportSession};
use crate::types::Result;

/// Request an outline and print it
pub fn run(
    topic: &str,
    words: u32,
    summary: Option<String>,
    format: &str,
    overrides: LlmOverrides,
) -> Result<()> {
    let mut request = ReportRequest::new(topic.trim(), words);
    if let Some(summary) = summary {
        request = request.with_summary(summary);
    }

    let ctx = CommandContext::load(&overrides)?;
    let rt = Runtime::new()?;
    let mut session = ReportSession::new(
        ctx.provider.clone(),
        Arc::new(LogSink),
        ctx.config.generation.clone(),
    );
    let outline = rt.block_on(session.start(request))?;

    println!("{}", render(outline, format == "json")?);
    if outline.has_orphans() {
        Output::new().warning(&format!(
            "{} sections have no parent in the outline and were skipped",
            outline.orphans.len()
        ));
    }
    Ok(())
}

fn render(outline: &ParsedOutline, as_json: bool) -> Result<String> {
    if as_json {
        Ok(serde_json::to_string_pretty(outline)?)
    } else {
        Ok(outline.root.to_text(true, ""))
    }
}
