//! Document assembler
//!
//! Linearizes a generated outline into heading and body blocks, pre-order,
//! for a [`super::formatter::DocumentFormatter`]. Performs no generation.

use serde::Serialize;

use super::outline::OutlineNode;

/// Visual heading level. Sections nested deeper than three levels are
/// rendered as subsections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingLevel {
    Chapter,
    Section,
    Subsection,
}

impl HeadingLevel {
    pub fn from_level(level: usize) -> Self {
        match level {
            0 | 1 => Self::Chapter,
            2 => Self::Section,
            _ => Self::Subsection,
        }
    }

    /// 1, 2 or 3
    pub fn depth(self) -> usize {
        match self {
            Self::Chapter => 1,
            Self::Section => 2,
            Self::Subsection => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading(HeadingLevel),
    Body,
}

/// One render instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentBlock {
    pub kind: BlockKind,
    pub text: String,
}

impl DocumentBlock {
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Heading(level),
            text: text.into(),
        }
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Body,
            text: text.into(),
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, BlockKind::Heading(_))
    }
}

/// Everything a formatter needs, in output order
#[derive(Debug, Clone, Serialize)]
pub struct AssembledDocument {
    pub title: String,
    pub summary: String,
    pub blocks: Vec<DocumentBlock>,
}

/// Walk the root's children pre-order. Each numbered node yields a heading;
/// a leaf with content yields a body block right after its heading.
pub fn assemble(title: &str, summary: &str, root: &OutlineNode) -> AssembledDocument {
    let mut blocks = Vec::new();
    for child in &root.children {
        push_node(child, &mut blocks);
    }

    AssembledDocument {
        title: title.to_string(),
        summary: summary.to_string(),
        blocks,
    }
}

fn push_node(node: &OutlineNode, blocks: &mut Vec<DocumentBlock>) {
    if let Some(number) = node.number.as_deref()
        && !node.title.is_empty()
    {
        blocks.push(DocumentBlock::heading(
            HeadingLevel::from_level(node.level),
            format!("{} {}", number, node.title),
        ));
    }

    if node.is_leaf() && !node.content.is_empty() {
        blocks.push(DocumentBlock::body(node.content.as_str()));
    }

    for child in &node.children {
        push_node(child, blocks);
    }
}
