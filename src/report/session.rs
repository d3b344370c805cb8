//! Report sessions
//!
//! A session owns one report from request to exported file: summary, outline,
//! generated tree and statistics. Front ends hold one session per
//! conversation and drive it through its states:
//!
//! ```text
//! AwaitingRequest -> OutlineReady -> Generated -> Exported
//!                      ^    |
//!                      +----+  regenerate_outline
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::assembler::{AssembledDocument, assemble};
use super::formatter::{DocumentFormatter, ExportedDocument};
use super::generator::{ContentGenerator, GenerationContext, GenerationStats};
use super::parser::{OutlineParser, ParsedOutline};
use super::progress::{ProgressSink, ProgressUpdate};
use super::prompts::{build_outline_prompt, build_summary_prompt};
use crate::ai::provider::SharedProvider;
use crate::config::GenerationConfig;
use crate::types::{LongformError, Result, SessionId};

// =============================================================================
// Request
// =============================================================================

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub title: String,
    /// User-supplied overview; generated when absent
    pub summary: Option<String>,
    pub total_words: u32,
}

impl ReportRequest {
    pub fn new(title: impl Into<String>, total_words: u32) -> Self {
        Self {
            title: title.into(),
            summary: None,
            total_words,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        let summary = summary.into();
        self.summary = Some(summary).filter(|s| !s.trim().is_empty());
        self
    }

    /// Parse a request message:
    ///
    /// ```text
    /// 主题：<title>
    /// 概述：<summary>     (optional)
    /// 字数：<n>
    /// ```
    ///
    /// Full-width and ASCII colons are both accepted.
    pub fn parse(message: &str) -> Result<Self> {
        let mut title = None;
        let mut summary = None;
        let mut words = None;

        for line in message.lines().map(str::trim) {
            if let Some(value) = field_value(line, "主题") {
                title = Some(value.to_string());
            } else if let Some(value) = field_value(line, "概述") {
                summary = Some(value.to_string());
            } else if let Some(value) = field_value(line, "字数") {
                words = Some(value.to_string());
            }
        }

        let title = title
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LongformError::InvalidRequest("缺少主题（主题：…）".to_string()))?;

        let raw_words =
            words.ok_or_else(|| LongformError::InvalidRequest("缺少字数（字数：…）".to_string()))?;
        let total_words: u32 = raw_words
            .trim_end_matches('字')
            .trim()
            .parse()
            .map_err(|_| LongformError::InvalidRequest(format!("字数不是有效的整数：{}", raw_words)))?;
        if total_words == 0 {
            return Err(LongformError::InvalidRequest(
                "字数必须大于0".to_string(),
            ));
        }

        let request = Self::new(title, total_words);
        Ok(match summary {
            Some(summary) => request.with_summary(summary),
            None => request,
        })
    }
}

fn field_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?;
    rest.strip_prefix('：')
        .or_else(|| rest.strip_prefix(':'))
        .map(str::trim)
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    AwaitingRequest,
    OutlineReady,
    Generated,
    Exported,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingRequest => "awaiting request",
            Self::OutlineReady => "outline ready",
            Self::Generated => "generated",
            Self::Exported => "exported",
        };
        f.write_str(name)
    }
}

/// One report, owned by one conversation
pub struct ReportSession {
    id: SessionId,
    provider: SharedProvider,
    sink: Arc<dyn ProgressSink>,
    config: GenerationConfig,
    state: SessionState,
    request: Option<ReportRequest>,
    summary: String,
    outline_text: String,
    outline: Option<ParsedOutline>,
    stats: Option<GenerationStats>,
}

impl ReportSession {
    pub fn new(
        provider: SharedProvider,
        sink: Arc<dyn ProgressSink>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            id: SessionId::generate(),
            provider,
            sink,
            config,
            state: SessionState::AwaitingRequest,
            request: None,
            summary: String::new(),
            outline_text: String::new(),
            outline: None,
            stats: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn request(&self) -> Option<&ReportRequest> {
        self.request.as_ref()
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Outline exactly as the service returned it
    pub fn outline_text(&self) -> &str {
        &self.outline_text
    }

    pub fn outline(&self) -> Option<&ParsedOutline> {
        self.outline.as_ref()
    }

    pub fn stats(&self) -> Option<&GenerationStats> {
        self.stats.as_ref()
    }

    /// Begin a report: obtain a summary if none was given, then the outline.
    /// Any previous report held by this session is discarded.
    #[instrument(skip_all, fields(title = %request.title, words = request.total_words))]
    pub async fn start(&mut self, request: ReportRequest) -> Result<&ParsedOutline> {
        self.reset();
        self.id = SessionId::generate();

        let summary = match request.summary.as_deref() {
            Some(summary) => summary.to_string(),
            None => {
                self.sink.update(ProgressUpdate::status("正在生成摘要..."));
                let response = self
                    .provider
                    .generate(&build_summary_prompt(&request.title))
                    .await?;
                response.content.trim().to_string()
            }
        };

        self.summary = summary;
        self.request = Some(request);
        self.request_outline().await
    }

    /// Replace the current outline with a freshly requested one
    pub async fn regenerate_outline(&mut self) -> Result<&ParsedOutline> {
        if self.request.is_none() {
            return Err(self.wrong_state("regenerate the outline"));
        }
        self.stats = None;
        self.request_outline().await
    }

    async fn request_outline(&mut self) -> Result<&ParsedOutline> {
        let request = self
            .request
            .as_ref()
            .ok_or_else(|| LongformError::Session("no report request".to_string()))?;

        self.sink.update(ProgressUpdate::status("正在生成大纲..."));
        let prompt = build_outline_prompt(&request.title, &self.summary, request.total_words);
        let response = self.provider.generate(&prompt).await?;

        let root_title = self.config.root_title.as_deref().unwrap_or(&request.title);
        let parsed = OutlineParser::new(root_title).parse(&response.content);
        if parsed.is_empty() {
            warn!("Outline response contained no recognisable sections");
        }
        info!(
            "Outline ready: {} top-level sections, {}字 planned, {} orphans",
            parsed.root.children.len(),
            parsed.root.children_words(),
            parsed.orphans.len()
        );

        self.outline_text = response.content;
        self.state = SessionState::OutlineReady;
        Ok(self.outline.insert(parsed))
    }

    /// Generate the report body from the current outline
    pub async fn generate(&mut self) -> Result<GenerationStats> {
        if self.state != SessionState::OutlineReady {
            return Err(self.wrong_state("generate content"));
        }
        let (Some(request), Some(outline)) = (self.request.as_ref(), self.outline.as_mut()) else {
            return Err(self.wrong_state("generate content"));
        };

        let context = GenerationContext::new(&request.title, &self.summary, &outline.root);
        let mut generator =
            ContentGenerator::new(self.provider.clone(), self.sink.clone(), &self.config);
        let stats = generator.generate(&context, &mut outline.root).await?;

        self.stats = Some(stats.clone());
        self.state = SessionState::Generated;
        Ok(stats)
    }

    /// Linearize the generated tree
    pub fn assemble(&self) -> Result<AssembledDocument> {
        if !matches!(self.state, SessionState::Generated | SessionState::Exported) {
            return Err(self.wrong_state("assemble the document"));
        }
        let (Some(request), Some(outline)) = (self.request.as_ref(), self.outline.as_ref()) else {
            return Err(self.wrong_state("assemble the document"));
        };
        Ok(assemble(&request.title, &self.summary, &outline.root))
    }

    /// Assemble and write the document
    pub fn export(
        &mut self,
        formatter: &dyn DocumentFormatter,
        output_dir: &Path,
    ) -> Result<ExportedDocument> {
        let document = self.assemble()?;
        let exported = formatter.export(&document, output_dir)?;
        self.state = SessionState::Exported;
        Ok(exported)
    }

    fn reset(&mut self) {
        self.state = SessionState::AwaitingRequest;
        self.request = None;
        self.summary.clear();
        self.outline_text.clear();
        self.outline = None;
        self.stats = None;
    }

    fn wrong_state(&self, action: &str) -> LongformError {
        LongformError::Session(format!(
            "cannot {} while session {} is {}",
            action, self.id, self.state
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::formatter::MarkdownFormatter;
    use crate::report::prompts::{OUTLINE_MARKER, SUMMARY_MARKER};
    use crate::report::test_support::{RecordingSink, SAMPLE_OUTLINE, ScriptedProvider};
    use tempfile::TempDir;

    fn new_session(provider: &Arc<ScriptedProvider>) -> (ReportSession, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let session = ReportSession::new(provider.clone(), sink.clone(), GenerationConfig::default());
        (session, sink)
    }

    #[test]
    fn test_parse_request() {
        let request = ReportRequest::parse("主题：智慧水务方案\n概述：数字孪生底座\n字数：30000").unwrap();
        assert_eq!(request.title, "智慧水务方案");
        assert_eq!(request.summary.as_deref(), Some("数字孪生底座"));
        assert_eq!(request.total_words, 30000);
    }

    #[test]
    fn test_parse_request_ascii_colon_and_unit() {
        let request = ReportRequest::parse("  主题: 智慧水务\n字数: 5000字\n").unwrap();
        assert_eq!(request.title, "智慧水务");
        assert_eq!(request.summary, None);
        assert_eq!(request.total_words, 5000);
    }

    #[test]
    fn test_parse_request_errors() {
        for message in ["字数：3000", "主题：\n字数：3000", "主题：x", "主题：x\n字数：很多", "主题：x\n字数：0"] {
            let err = ReportRequest::parse(message).unwrap_err();
            assert!(matches!(err, LongformError::InvalidRequest(_)), "{}", message);
        }
    }

    #[test]
    fn test_blank_summary_treated_as_missing() {
        let request = ReportRequest::new("t", 100).with_summary("  ");
        assert_eq!(request.summary, None);
    }

    #[tokio::test]
    async fn test_start_generates_summary_then_outline() {
        let provider = Arc::new(ScriptedProvider::new().with_summary("  生成的摘要。\n"));
        let (mut session, sink) = new_session(&provider);

        let outline = session.start(ReportRequest::new("智慧水务", 1400)).await.unwrap();
        assert_eq!(outline.root.children.len(), 2);
        assert_eq!(outline.root.title, "智慧水务");

        assert_eq!(session.state(), SessionState::OutlineReady);
        assert_eq!(session.summary(), "生成的摘要。");
        assert_eq!(session.outline_text(), SAMPLE_OUTLINE);

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains(SUMMARY_MARKER));
        assert!(prompts[1].contains(OUTLINE_MARKER));
        assert!(prompts[1].contains("摘要：生成的摘要。"));
        assert_eq!(sink.messages(), vec!["正在生成摘要...", "正在生成大纲..."]);
    }

    #[tokio::test]
    async fn test_configured_root_title_overrides_report_title() {
        let provider = Arc::new(ScriptedProvider::new());
        let config = GenerationConfig {
            root_title: Some("报告正文".to_string()),
            ..Default::default()
        };
        let mut session =
            ReportSession::new(provider.clone(), Arc::new(RecordingSink::default()), config);

        let request = ReportRequest::new("智慧水务", 1400).with_summary("s");
        let outline = session.start(request).await.unwrap();
        assert_eq!(outline.root.title, "报告正文");
    }

    #[tokio::test]
    async fn test_start_with_summary_skips_summary_request() {
        let provider = Arc::new(ScriptedProvider::new());
        let (mut session, _sink) = new_session(&provider);

        let request = ReportRequest::new("智慧水务", 1400).with_summary("用户概述");
        session.start(request).await.unwrap();

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("摘要：用户概述"));
    }

    #[tokio::test]
    async fn test_regenerate_outline_replaces_tree() {
        let provider = Arc::new(
            ScriptedProvider::new().with_outlines(&["1. 甲 (500字)", "1. 乙 (300字)\n2. 丙 (300字)"]),
        );
        let (mut session, _sink) = new_session(&provider);
        session
            .start(ReportRequest::new("t", 600).with_summary("s"))
            .await
            .unwrap();
        assert_eq!(session.outline().unwrap().root.children.len(), 1);

        let outline = session.regenerate_outline().await.unwrap();
        assert_eq!(outline.root.children.len(), 2);
        assert_eq!(session.state(), SessionState::OutlineReady);
    }

    #[tokio::test]
    async fn test_out_of_order_operations_rejected() {
        let provider = Arc::new(ScriptedProvider::new());
        let (mut session, _sink) = new_session(&provider);

        assert!(matches!(session.generate().await, Err(LongformError::Session(_))));
        assert!(matches!(
            session.regenerate_outline().await,
            Err(LongformError::Session(_))
        ));
        assert!(matches!(session.assemble(), Err(LongformError::Session(_))));
        assert!(provider.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_full_flow_exports() {
        let provider = Arc::new(ScriptedProvider::new());
        let (mut session, _sink) = new_session(&provider);
        let temp_dir = TempDir::new().unwrap();

        session
            .start(ReportRequest::new("智慧水务", 1400).with_summary("概述"))
            .await
            .unwrap();
        let stats = session.generate().await.unwrap();
        assert_eq!(stats.sections_generated, 3);
        assert_eq!(session.state(), SessionState::Generated);

        // generation is single-pass
        assert!(matches!(session.generate().await, Err(LongformError::Session(_))));

        let exported = session
            .export(&MarkdownFormatter::new("report"), temp_dir.path())
            .unwrap();
        assert_eq!(session.state(), SessionState::Exported);

        let written = std::fs::read_to_string(&exported.path).unwrap();
        assert!(written.starts_with("# 智慧水务\n\n## 摘要\n\n概述"));
        assert!(written.contains("## 1 引言"));
        assert!(written.contains("### 1.1 背景"));
        assert!(written.contains(&ScriptedProvider::section_text("结论")));
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_nothing_exported() {
        let provider = Arc::new(ScriptedProvider::new().fail_when("当前部分：意义"));
        let (mut session, _sink) = new_session(&provider);

        session
            .start(ReportRequest::new("t", 1400).with_summary("s"))
            .await
            .unwrap();
        let err = session.generate().await.unwrap_err();

        assert!(err.is_generation_failure());
        assert_eq!(session.state(), SessionState::OutlineReady);
        assert!(session.assemble().is_err());
        assert!(session.stats().is_none());
    }
}
