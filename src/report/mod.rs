//! Outline-driven report generation
//!
//! A report is produced in three passes over one outline tree:
//!
//! 1. [`parser`] turns the service's numbered outline into an [`OutlineNode`] tree
//! 2. [`generator`] fills every node's content depth-first, splitting sections
//!    larger than the part length into sub-outlines
//! 3. [`assembler`] linearizes the tree for a [`DocumentFormatter`]
//!
//! [`ReportSession`] ties the passes together for one request.

pub mod assembler;
pub mod formatter;
pub mod generator;
pub mod outline;
pub mod parser;
pub mod progress;
pub mod prompts;
pub mod session;
pub mod word_count;

#[cfg(test)]
pub(crate) mod test_support;

pub use assembler::{AssembledDocument, BlockKind, DocumentBlock, HeadingLevel, assemble};
pub use formatter::{DocumentFormatter, ExportedDocument, MarkdownFormatter};
pub use generator::{ContentGenerator, GenerationContext, GenerationStats};
pub use outline::OutlineNode;
pub use parser::{OutlineParser, ParsedOutline, parse_outline};
pub use progress::{LogSink, NullSink, ProgressSink, ProgressUpdate};
pub use session::{ReportRequest, ReportSession, SessionState};
pub use word_count::count_target_chars;
