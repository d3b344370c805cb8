//! Chat Command
//!
//! Conversational front end. Collects a report request, shows the summary and
//! outline, then generates and exports on request.
//!
//! Usage:
//!   longform chat

use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Runtime;
use tracing::warn;

use super::super::progress::{ConsoleRenderer, MessageLevel, ProgressTracker};
use super::super::ui::Output;
use super::super::util::{CommandContext, LlmOverrides, check_provider};
use crate::ai::provider::SharedProvider;
use crate::config::Config;
use crate::report::{
    DocumentFormatter, MarkdownFormatter, ReportRequest, ReportSession, SessionState,
};
use crate::types::{LongformError, Result};

pub const CONTINUE_COMMAND: &str = "继续生成";
pub const REGENERATE_COMMAND: &str = "重新生成";

pub const WELCOME: &str = "你好！我是AI写作助手。请按以下格式输入报告需求：\n\
主题：你的报告主题\n\
概述：报告概述（可选）\n\
字数：期望的总字数\n\
#例如：#\n\
主题：张家界实景三维大屏展示系统项目建设方案\n\
字数：30000";

const HINT: &str = "请输入：\n1. '继续生成' - 开始生成正文\n2. '重新生成' - 重新生成大纲";

/// One chat: a report session plus where its output goes
pub struct Conversation {
    session: ReportSession,
    tracker: ProgressTracker,
    formatter: Box<dyn DocumentFormatter>,
    output_dir: PathBuf,
}

impl Conversation {
    pub fn new(provider: SharedProvider, tracker: ProgressTracker, config: &Config) -> Self {
        let session = ReportSession::new(
            provider,
            std::sync::Arc::new(tracker.clone()),
            config.generation.clone(),
        );
        Self {
            session,
            tracker,
            formatter: Box::new(MarkdownFormatter::new(&config.output.file_prefix)),
            output_dir: config.output.output_dir.clone(),
        }
    }

    pub fn session(&self) -> &ReportSession {
        &self.session
    }

    /// Handle one user message and return the reply
    pub async fn handle_message(&mut self, text: &str) -> String {
        let text = text.trim();
        match text {
            CONTINUE_COMMAND => self.continue_generation().await,
            REGENERATE_COMMAND => self.regenerate().await,
            _ if text.contains("主题") || self.session.state() == SessionState::AwaitingRequest => {
                self.start(text).await
            }
            _ => HINT.to_string(),
        }
    }

    async fn start(&mut self, text: &str) -> String {
        let request = match ReportRequest::parse(text) {
            Ok(request) => request,
            Err(e) => return self.fail("输入格式有误，请重新输入。错误信息", &e),
        };

        if let Err(e) = self.session.start(request).await {
            return self.fail("生成大纲时发生错误", &e);
        }
        self.outline_reply()
    }

    async fn regenerate(&mut self) -> String {
        if self.session.request().is_none() {
            return WELCOME.to_string();
        }
        if let Err(e) = self.session.regenerate_outline().await {
            return self.fail("重新生成大纲时发生错误", &e);
        }
        self.outline_reply()
    }

    async fn continue_generation(&mut self) -> String {
        let Some(request) = self.session.request() else {
            return WELCOME.to_string();
        };
        if self.session.state() != SessionState::OutlineReady {
            return "正文已生成。请输入新的报告需求，或输入'重新生成'重新生成大纲。".to_string();
        }

        let leaves = self
            .session
            .outline()
            .map(|o| o.root.leaves().len())
            .unwrap_or_default();
        self.tracker.start(&request.title, leaves);

        let result = self.generate_and_export().await;
        self.tracker.end_run();

        match result {
            Ok(reply) => reply,
            Err(e) => self.fail("生成内容时发生错误", &e),
        }
    }

    async fn generate_and_export(&mut self) -> Result<String> {
        let stats = self.session.generate().await?;
        let exported = self
            .session
            .export(self.formatter.as_ref(), &self.output_dir)?;

        Ok(format!(
            "报告生成完成！已导出到文件：{}\n共请求 {} 次，生成 {} 字",
            exported.path.display(),
            stats.llm_calls,
            stats.target_chars
        ))
    }

    fn outline_reply(&self) -> String {
        let mut reply = format!(
            "已生成摘要和大纲：\n\n摘要：\n{}\n\n大纲：\n{}\n\n",
            self.session.summary(),
            self.session.outline_text().trim()
        );
        match self.session.outline() {
            Some(outline) if outline.is_empty() => {
                reply.push_str("（未能识别大纲中的章节，建议输入'重新生成'）\n\n");
            }
            Some(outline) if outline.has_orphans() => {
                reply.push_str(&format!(
                    "（有 {} 个章节缺少上级编号，已忽略）\n\n",
                    outline.orphans.len()
                ));
            }
            _ => {}
        }
        reply.push_str(HINT);
        reply
    }

    /// Report an error through the progress channel and as the reply
    fn fail(&self, context: &str, error: &LongformError) -> String {
        let message = format!("{}：{}", context, error);
        warn!("{}", message);
        self.tracker.message(MessageLevel::Error, &message);
        message
    }
}

/// Run the chat loop over stdin/stdout
pub fn run(overrides: LlmOverrides) -> Result<()> {
    let ctx = CommandContext::load(&overrides)?;
    let rt = Runtime::new()?;
    rt.block_on(run_async(ctx))
}

async fn run_async(ctx: CommandContext) -> Result<()> {
    let output = Output::new();
    check_provider(&ctx.provider, &output).await;

    let tracker = ProgressTracker::new();
    let render_handle = ConsoleRenderer::new(tracker.clone()).start_render_loop();

    let mut conversation = Conversation::new(ctx.provider.clone(), tracker.clone(), &ctx.config);
    output.reply(WELCOME);

    // A request spans several lines; an empty line submits it
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut buffer = String::new();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if matches!(trimmed, "exit" | "quit" | "退出") {
            break;
        }

        let is_command = matches!(trimmed, CONTINUE_COMMAND | REGENERATE_COMMAND);
        if !trimmed.is_empty() && !is_command {
            buffer.push_str(trimmed);
            buffer.push('\n');
            continue;
        }

        let message = if is_command {
            trimmed.to_string()
        } else {
            std::mem::take(&mut buffer)
        };
        if message.trim().is_empty() {
            continue;
        }

        let reply = conversation.handle_message(&message).await;
        output.reply(&reply);
    }

    tracker.finish(true, "会话结束");
    let _ = render_handle.await;
    Ok(())
}
