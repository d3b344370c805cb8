//! Outline tree model
//!
//! An outline is a tree of numbered, word-budgeted sections. The parser builds
//! it once, the generator fills in `content`, and the assembler reads it back
//! out in document order.

use serde::{Deserialize, Serialize};

use crate::constants::outline::{INDENT, SIMPLE_PREFIX, WORD_UNIT};

/// One section of an outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Section title
    pub title: String,

    /// Target word budget. For internal nodes this is informational only.
    pub words: u32,

    /// Dotted number such as `2.1`; `None` only for a synthetic root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    /// Number of dotted components; 0 for the root
    pub level: usize,

    /// Generated prose. Internal nodes hold the joined content of their children.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,

    /// Children in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Numbered section; `level` is derived from the number
    pub fn new(title: impl Into<String>, words: u32, number: impl Into<String>) -> Self {
        let number = number.into();
        let level = number.split('.').count();
        Self {
            title: title.into(),
            words,
            number: Some(number),
            level,
            content: String::new(),
            children: Vec::new(),
        }
    }

    /// Synthetic, unnumbered root with a zero budget
    pub fn root(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            words: 0,
            number: None,
            level: 0,
            content: String::new(),
            children: Vec::new(),
        }
    }

    /// Append a child. Numbering consistency is the caller's concern.
    pub fn add_child(&mut self, node: OutlineNode) {
        self.children.push(node);
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.number.is_none()
    }

    /// Render this node and its descendants, one line per node, each level
    /// indented four spaces deeper than its parent.
    pub fn to_text(&self, include_words: bool, indent: &str) -> String {
        let mut lines = Vec::new();
        self.render_into(&mut lines, include_words, indent);
        lines.join("\n")
    }

    /// `to_text` with word annotations and a fixed `- ` prefix
    pub fn to_simple_text(&self) -> String {
        self.to_text(true, SIMPLE_PREFIX)
    }

    fn render_into(&self, lines: &mut Vec<String>, include_words: bool, indent: &str) {
        let number = self.number.as_deref().unwrap_or("");
        let line = if include_words {
            format!(
                "{}{} {} ({}{})",
                indent, number, self.title, self.words, WORD_UNIT
            )
        } else {
            format!("{}{} {}", indent, number, self.title)
        };
        lines.push(line);

        let child_indent = format!("{}{}", indent, INDENT);
        for child in &self.children {
            child.render_into(lines, include_words, &child_indent);
        }
    }

    /// Sum of the direct children's budgets
    pub fn children_words(&self) -> u64 {
        self.children.iter().map(|c| u64::from(c.words)).sum()
    }

    /// All nodes below this one, pre-order
    pub fn descendants(&self) -> Vec<&OutlineNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&OutlineNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Leaf sections below this one, in document order
    pub fn leaves(&self) -> Vec<&OutlineNode> {
        self.descendants()
            .into_iter()
            .filter(|n| n.is_leaf())
            .collect()
    }

    /// Depth-first lookup by dotted number
    pub fn find(&self, number: &str) -> Option<&OutlineNode> {
        self.descendants()
            .into_iter()
            .find(|n| n.number.as_deref() == Some(number))
    }
}
