//! Outline parser
//!
//! Converts a free-text outline returned by the text generation service into
//! an [`OutlineNode`] tree. Every significant line looks like
//! `<dotted-number>[.] <title> (<N>字)`; anything else (markdown headers,
//! commentary, blank lines, totals) is skipped.
//!
//! Parent resolution only sees nodes that appear earlier in the text. A node
//! whose parent number has not been seen yet is an orphan: it is kept in
//! [`ParsedOutline::orphans`] but never attached to the tree.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use super::outline::OutlineNode;

/// `<number> <title> (<words>字)`, full-width parentheses tolerated
static OUTLINE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+[.\d]*)\s*(.+?)\s*[(（](\d+)字[)）]").expect("valid outline line regex")
});

/// Result of parsing an outline response
#[derive(Debug, Clone, Serialize)]
pub struct ParsedOutline {
    /// Synthetic root holding every attached section
    pub root: OutlineNode,

    /// Sections whose parent number never appeared before them, with any
    /// descendants that resolved to them
    pub orphans: Vec<OutlineNode>,

    /// Non-blank lines that did not match the outline format
    pub skipped_lines: usize,
}

impl ParsedOutline {
    /// No section was recognised at all
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    pub fn has_orphans(&self) -> bool {
        !self.orphans.is_empty()
    }
}

/// Where a parsed line ends up
#[derive(Debug, Clone, Copy)]
enum Attach {
    Root,
    Parent(usize),
    Orphan,
}

/// Outline parser with a fixed root title
#[derive(Debug, Clone)]
pub struct OutlineParser {
    root_title: String,
}

impl OutlineParser {
    pub fn new(root_title: impl Into<String>) -> Self {
        Self {
            root_title: root_title.into(),
        }
    }

    /// Parse outline text. Never fails; malformed input degrades to a partial
    /// or empty tree.
    pub fn parse(&self, text: &str) -> ParsedOutline {
        let mut slots: Vec<Option<OutlineNode>> = Vec::new();
        let mut attach: Vec<Attach> = Vec::new();
        let mut by_number: HashMap<String, usize> = HashMap::new();
        let mut skipped_lines = 0;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let Some((number, title, words)) = Self::match_line(line) else {
                skipped_lines += 1;
                continue;
            };

            let node = OutlineNode::new(title, words, number.clone());
            debug!(
                "Parsed outline line: number={}, title={}, words={}, level={}",
                number, node.title, words, node.level
            );

            let target = if node.level <= 1 {
                Attach::Root
            } else {
                let parent_number = number
                    .rsplit_once('.')
                    .map(|(parent, _)| parent)
                    .unwrap_or_default();
                match by_number.get(parent_number) {
                    Some(&idx) => Attach::Parent(idx),
                    None => {
                        warn!(
                            "Outline section '{} {}' has no preceding parent '{}'; left unattached",
                            number, node.title, parent_number
                        );
                        Attach::Orphan
                    }
                }
            };

            let idx = slots.len();
            by_number.entry(number).or_insert(idx);
            slots.push(Some(node));
            attach.push(target);
        }

        let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
        let mut top_level = Vec::new();
        let mut orphan_ids = Vec::new();
        for (idx, target) in attach.iter().enumerate() {
            match *target {
                Attach::Root => top_level.push(idx),
                Attach::Parent(parent) => children_of[parent].push(idx),
                Attach::Orphan => orphan_ids.push(idx),
            }
        }

        let mut root = OutlineNode::root(&self.root_title);
        for idx in top_level {
            if let Some(node) = Self::build(idx, &mut slots, &children_of) {
                root.add_child(node);
            }
        }

        let orphans: Vec<OutlineNode> = orphan_ids
            .into_iter()
            .filter_map(|idx| Self::build(idx, &mut slots, &children_of))
            .collect();

        ParsedOutline {
            root,
            orphans,
            skipped_lines,
        }
    }

    fn match_line(line: &str) -> Option<(String, String, u32)> {
        let caps = OUTLINE_LINE.captures(line)?;
        let number = caps[1].trim_matches('.').to_string();
        let title = caps[2].trim_matches(Self::is_title_noise).to_string();
        let words = caps[3].parse().ok()?;
        if number.is_empty() || title.is_empty() {
            return None;
        }
        Some((number, title, words))
    }

    /// Markdown emphasis left around a title, e.g. `**1. 引言** (800字)`
    fn is_title_noise(c: char) -> bool {
        c.is_whitespace() || matches!(c, '*' | '_' | '`')
    }

    /// Move node `idx` and its resolved descendants out of `slots`
    fn build(
        idx: usize,
        slots: &mut [Option<OutlineNode>],
        children_of: &[Vec<usize>],
    ) -> Option<OutlineNode> {
        let mut node = slots[idx].take()?;
        for &child in &children_of[idx] {
            if let Some(child_node) = Self::build(child, slots, children_of) {
                node.add_child(child_node);
            }
        }
        Some(node)
    }
}

/// Parse outline text into a tree rooted at `root_title`, dropping orphans
pub fn parse_outline(text: &str, root_title: &str) -> OutlineNode {
    OutlineParser::new(root_title).parse(text).root
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TWO_BLOCKS: &str = r#"
# 张家界实景三维大屏展示系统项目建设方案报告大纲

1. 引言 (3000字)
    1.1 项目背景 (1000字)
    1.2 研究目的与意义 (1000字)
    1.3 报告结构概述 (1000字)

2. 项目概述 (4000字)
    2.1 张家界旅游资源概述 (1500字)
    2.2 三维大屏展示系统的定义与功能 (1500字)
    2.3 项目目标与预期成果 (1000字)

3. 系统架构 (5000字)
    3.1 系统整体架构设计 (2000字)
    3.2 硬件配置与选型 (1500字)
    3.3 软件架构设计 (1500字)

4. 技术选型 (5000字)
    4.1 三维可视化技术分析 (2000字)
    4.2 数据处理与存储技术 (1500字)
    4.3 交互技术与用户体验设计 (1500字)

5. 内容制作 (5000字)
    5.1 内容策划与需求分析 (2000字)
    5.2 三维模型与动画制作 (2000字)
    5.3 多媒体内容整合 (1000字)

---

6. 维护与管理 (3000字)
    6.1 系统维护的必要性 (1000字)
    6.2 维护管理流程 (1000字)
    6.3 数据更新与内容管理 (1000字)

7. 市场分析与推广策略 (4000字)
    7.1 目标用户群体分析 (1500字)
    7.2 竞争分析与市场机会 (1500字)
    7.3 推广策略与渠道 (1000字)

8. 项目实施步骤 (3000字)
    8.1 项目规划阶段 (1000字)
    8.2 实施与监控阶段 (1000字)
    8.3 项目评估与反馈 (1000字)

9. 经济效益分析 (3000字)
    9.1 投资预算与成本控制 (1000字)
    9.2 经济效益预测 (1000字)
    9.3 社会效益与文化传播 (1000字)

10. 结论与展望 (2000字)
    10.1 项目总结 (1000字)
    10.2 未来发展方向 (1000字)

---

**总字数：37000字**
"#;

    #[test]
    fn test_parse_two_blocks() {
        let root = parse_outline(TWO_BLOCKS, "报告正文");

        assert_eq!(root.title, "报告正文");
        assert_eq!(root.words, 0);
        assert_eq!(root.children.len(), 10);
        assert_eq!(root.children_words(), 37000);

        let intro = &root.children[0];
        assert_eq!(intro.title, "引言");
        assert_eq!(intro.words, 3000);
        assert_eq!(intro.number.as_deref(), Some("1"));
        assert_eq!(intro.children.len(), 3);
        assert_eq!(intro.children[0].title, "项目背景");
        assert_eq!(intro.children[0].words, 1000);
        assert_eq!(intro.children[0].level, 2);

        let last = &root.children[9];
        assert_eq!(last.number.as_deref(), Some("10"));
        assert_eq!(last.children[1].number.as_deref(), Some("10.2"));
    }

    #[test]
    fn test_markdown_noise_tolerated() {
        let text = "## 1. 引言 (3000字)\n   1.1 背景与意义 (1500字)\n ## 2. 概述 (500字)\n随便说点什么\n";
        let parsed = OutlineParser::new("root").parse(text);

        assert_eq!(parsed.root.children.len(), 2);
        assert_eq!(parsed.root.children[0].number.as_deref(), Some("1"));
        assert_eq!(parsed.root.children[0].children.len(), 1);
        assert_eq!(parsed.skipped_lines, 1);
    }

    #[test]
    fn test_list_and_emphasis_markers_stripped() {
        let text = "**1. 引言** (800字)\n- 1.1 背景 (500字)\n* 1.2 __意义__ (300字)\n";
        let root = parse_outline(text, "root");

        assert_eq!(root.children.len(), 1);
        let intro = &root.children[0];
        assert_eq!(intro.title, "引言");
        assert_eq!(intro.words, 800);
        let titles: Vec<_> = intro.children.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["背景", "意义"]);
        assert_eq!(intro.children[0].number.as_deref(), Some("1.1"));
    }

    #[test]
    fn test_huge_budgets_sum_without_overflow() {
        let root = parse_outline("1. 甲 (4000000000字)\n2. 乙 (4000000000字)", "r");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children_words(), 8_000_000_000);
    }

    #[test]
    fn test_full_width_parentheses() {
        let root = parse_outline("1. 引言（800字）", "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].words, 800);
    }

    #[test]
    fn test_depth_and_parent_resolution() {
        let text = "4. 技术 (3000字)\n4.2 数据 (1500字)\n4.2.3 存储 (500字)\n";
        let root = parse_outline(text, "root");

        let node = root.find("4.2.3").expect("node attached");
        assert_eq!(node.level, 3);
        let parent = root.find("4.2").expect("parent attached");
        assert_eq!(parent.children[0].title, "存储");
    }

    #[test]
    fn test_parent_must_precede_child() {
        let text = "4.2.3 存储 (500字)\n4. 技术 (3000字)\n4.2 数据 (1500字)\n";
        let parsed = OutlineParser::new("root").parse(text);

        assert!(parsed.root.find("4.2.3").is_none());
        assert_eq!(parsed.orphans.len(), 1);
        assert_eq!(parsed.orphans[0].number.as_deref(), Some("4.2.3"));
        assert!(parsed.root.find("4.2").is_some_and(|n| n.is_leaf()));
    }

    #[test]
    fn test_orphan_excluded_from_root() {
        let text = "1. 引言 (1000字)\n3.1 孤立 (500字)\n3.1.1 孤立子节 (200字)\n2. 结论 (1000字)\n";
        let parsed = OutlineParser::new("root").parse(text);

        let titles: Vec<_> = parsed.root.children.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["引言", "结论"]);
        assert!(parsed.root.find("3.1").is_none());
        assert!(parsed.has_orphans());
        // descendants of an orphan resolve to it
        assert_eq!(parsed.orphans.len(), 1);
        assert_eq!(parsed.orphans[0].children[0].title, "孤立子节");
    }

    #[test]
    fn test_duplicate_number_first_wins() {
        let text = "1. 甲 (1000字)\n1. 乙 (1000字)\n1.1 子 (500字)\n";
        let root = parse_outline(text, "root");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].children.len(), 1);
        assert!(root.children[1].is_leaf());
    }

    #[test]
    fn test_empty_and_garbage_input() {
        let parsed = OutlineParser::new("root").parse("");
        assert!(parsed.is_empty());
        assert_eq!(parsed.skipped_lines, 0);

        let parsed = OutlineParser::new("root").parse("抱歉，我无法生成大纲。\n\n总字数：3000字");
        assert!(parsed.is_empty());
        assert_eq!(parsed.skipped_lines, 2);
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let a = parse_outline(TWO_BLOCKS, "报告正文");
        let b = parse_outline(TWO_BLOCKS, "报告正文");
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_top_level_count_and_sum(
            sections in prop::collection::vec((1u32..5000, 0usize..4), 1..20)
        ) {
            let mut text = String::from("# 大纲\n\n");
            for (i, (words, subs)) in sections.iter().enumerate() {
                let n = i + 1;
                text.push_str(&format!("{}. 第{}章 ({}字)\n", n, n, words));
                for j in 1..=*subs {
                    text.push_str(&format!("    {}.{} 第{}节 ({}字)\n", n, j, j, words / 2));
                }
                text.push('\n');
            }

            let root = parse_outline(&text, "root");
            prop_assert_eq!(root.children.len(), sections.len());
            let expected: u64 = sections.iter().map(|(w, _)| u64::from(*w)).sum();
            prop_assert_eq!(root.children_words(), expected);
            for (child, (_, subs)) in root.children.iter().zip(&sections) {
                prop_assert_eq!(child.children.len(), *subs);
            }
        }
    }
}
