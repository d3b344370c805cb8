//! Document formatter
//!
//! Turns an [`AssembledDocument`] into a file on disk. The Markdown formatter
//! writes `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.md`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use super::assembler::{AssembledDocument, BlockKind};
use crate::constants::export::{SUMMARY_HEADING, TIMESTAMP_FORMAT};
use crate::types::{LongformError, Result};

/// Location of an exported document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub path: PathBuf,
    pub file_name: String,
}

/// Renders an assembled document into an output artifact
pub trait DocumentFormatter: Send + Sync {
    /// File extension without the dot
    fn extension(&self) -> &str;

    /// Render the document to text
    fn render(&self, doc: &AssembledDocument) -> String;

    /// Write the rendered document into `output_dir`, creating it if needed
    fn export(&self, doc: &AssembledDocument, output_dir: &Path) -> Result<ExportedDocument>;
}

/// Markdown output
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    file_prefix: String,
}

impl MarkdownFormatter {
    pub fn new(file_prefix: impl Into<String>) -> Self {
        Self {
            file_prefix: file_prefix.into(),
        }
    }

    fn file_name(&self) -> String {
        format!(
            "{}_{}.{}",
            self.file_prefix,
            Local::now().format(TIMESTAMP_FORMAT),
            self.extension()
        )
    }

    /// Body text as paragraphs. Blank lines and lines starting with `##`
    /// (headings the service embedded in its prose) are dropped.
    fn push_paragraphs(out: &mut String, text: &str) {
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("##") {
                continue;
            }
            out.push_str(line.trim_end());
            out.push_str("\n\n");
        }
    }
}

impl DocumentFormatter for MarkdownFormatter {
    fn extension(&self) -> &str {
        "md"
    }

    fn render(&self, doc: &AssembledDocument) -> String {
        let mut out = format!("# {}\n\n## {}\n\n", doc.title, SUMMARY_HEADING);
        Self::push_paragraphs(&mut out, &doc.summary);

        for block in &doc.blocks {
            match block.kind {
                BlockKind::Heading(level) => {
                    out.push_str(&"#".repeat(level.depth() + 1));
                    out.push(' ');
                    out.push_str(&block.text);
                    out.push_str("\n\n");
                }
                BlockKind::Body => Self::push_paragraphs(&mut out, &block.text),
            }
        }

        out
    }

    fn export(&self, doc: &AssembledDocument, output_dir: &Path) -> Result<ExportedDocument> {
        fs::create_dir_all(output_dir)
            .map_err(|e| LongformError::export(output_dir, e))?;

        let file_name = self.file_name();
        let path = output_dir.join(&file_name);
        fs::write(&path, self.render(doc)).map_err(|e| LongformError::export(&path, e))?;

        info!("Exported report to {}", path.display());
        Ok(ExportedDocument { path, file_name })
    }
}
