//! Report Generation Prompts
//!
//! Instruction templates for every request sent to the text generation
//! service. Outline requests ask for the `<number> <title> (<N>字)` line
//! format understood by [`super::parser`].

use crate::constants::generation::SUMMARY_MAX_CHARS;

/// Marker present in every sub-outline request
pub const SUB_OUTLINE_MARKER: &str = "子部分大纲";

/// Marker present in every direct section request
pub const SECTION_MARKER: &str = "请直接生成内容";

/// Marker present in every summary request
pub const SUMMARY_MARKER: &str = "生成一段简洁的摘要";

/// Marker present in every top-level outline request
pub const OUTLINE_MARKER: &str = "生成一个详细的报告大纲";

/// Summary of the report, requested when the user supplied none
pub fn build_summary_prompt(title: &str) -> String {
    format!(
        r#"请基于以下主题{SUMMARY_MARKER}，概括报告的主要内容和目的：

主题：{title}

要求：
1. 控制在{SUMMARY_MAX_CHARS}字以内
2. 清晰概括主要内容
3. 突出报告价值和意义
"#
    )
}

/// Top-level outline for the whole report
pub fn build_outline_prompt(title: &str, summary: &str, total_words: u32) -> String {
    format!(
        r#"基于以下主题和摘要{OUTLINE_MARKER}，并为每个部分标注预期字数。
总字数要求：{total_words}字

主题：{title}
摘要：{summary}

请按以下格式输出：
1. 第一部分标题 (预期字数)
    1.1 子部分标题 (预期字数)
    1.2 子部分标题 (预期字数)
    ...
2. 第二部分标题 (预期字数)
    2.1 子部分标题 (预期字数)
    2.2 子部分标题 (预期字数)
    ...
...

字数请写成"(1000字)"的形式。
注意：所有部分的字数总和应该接近要求的总字数。
"#
    )
}

/// Request splitting one oversized section into sub-sections
pub struct SubOutlinePrompt<'a> {
    pub title: &'a str,
    /// Whole outline in compact `- ` form
    pub full_outline: &'a str,
    pub section_title: &'a str,
    pub target_words: u32,
    pub max_length: u32,
}

impl SubOutlinePrompt<'_> {
    pub fn build(&self) -> String {
        let Self {
            title,
            full_outline,
            section_title,
            target_words,
            max_length,
        } = self;

        format!(
            r#"请为当前部分生成详细的{SUB_OUTLINE_MARKER}，并为每个子部分标注预期字数：

主题：{title}
全局大纲概述：
{full_outline}
当前部分标题：{section_title}
总字数要求：{target_words}字

要求：
1. 仅根据当前部分{section_title}生成子部分大纲，确保与全局大纲保持一致，但不直接引用全局大纲内容。
2. 将当前部分{section_title}的内容分成多个子部分，每个子部分不超过{max_length}字。
3. 子部分之间要有逻辑连贯性和自然过渡。
4. 按以下格式输出：
    1. 子部分标题 (字数)
    2. 子部分标题 (字数)
    ...
5. 请勿输出其他部分的大纲或与当前部分无关的信息。

现在，请开始生成 {section_title} 的子部分大纲：
"#
        )
    }
}

/// Request for the prose of one section
pub struct SectionPrompt<'a> {
    pub title: &'a str,
    pub summary: &'a str,
    pub section_title: &'a str,
    pub target_words: u32,
    pub level: usize,
    /// Whole outline with word annotations
    pub full_outline: &'a str,
    /// Outline of this section, when one exists
    pub section_outline: Option<&'a str>,
}

impl SectionPrompt<'_> {
    pub fn build(&self) -> String {
        let section_outline = self
            .section_outline
            .map(|outline| format!("当前节大纲：\n{}\n", outline))
            .unwrap_or_default();

        format!(
            r#"请基于以下信息生成内容：

报告主题：{title}
报告概述：{summary}
当前部分：{section_title}
目标字数：{target_words}字
当前层级：{level}级标题

全文大纲：
{full_outline}

{section_outline}
要求：
1. 内容要详实、专业、有深度
2. 控制在目标字数范围内
3. 行文流畅自然，注意与整体结构的连贯性
4. 如果提供了当前节大纲，需要严格按照大纲展开

{SECTION_MARKER}：
"#,
            title = self.title,
            summary = self.summary,
            section_title = self.section_title,
            target_words = self.target_words,
            level = self.level,
            full_outline = self.full_outline,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompt() {
        let prompt = build_summary_prompt("智慧水务");
        assert!(prompt.contains(SUMMARY_MARKER));
        assert!(prompt.contains("主题：智慧水务"));
        assert!(prompt.contains("200字以内"));
    }

    #[test]
    fn test_outline_prompt_carries_budget() {
        let prompt = build_outline_prompt("智慧水务", "摘要内容", 30000);
        assert!(prompt.contains(OUTLINE_MARKER));
        assert!(prompt.contains("总字数要求：30000字"));
        assert!(prompt.contains("摘要：摘要内容"));
        assert!(!prompt.contains(SUB_OUTLINE_MARKER));
    }

    #[test]
    fn test_sub_outline_prompt() {
        let prompt = SubOutlinePrompt {
            title: "智慧水务",
            full_outline: "- 1 引言 (3000字)",
            section_title: "引言",
            target_words: 3000,
            max_length: 1000,
        }
        .build();
        assert!(prompt.contains(SUB_OUTLINE_MARKER));
        assert!(prompt.contains("当前部分标题：引言"));
        assert!(prompt.contains("不超过1000字"));
        assert!(prompt.contains("- 1 引言 (3000字)"));
        assert!(!prompt.contains(SECTION_MARKER));
    }

    #[test]
    fn test_section_prompt_optional_outline() {
        let mut section = SectionPrompt {
            title: "智慧水务",
            summary: "摘要",
            section_title: "背景",
            target_words: 800,
            level: 2,
            full_outline: "1 引言 (800字)",
            section_outline: None,
        };
        let prompt = section.build();
        assert!(prompt.contains(SECTION_MARKER));
        assert!(prompt.contains("当前层级：2级标题"));
        assert!(!prompt.contains("当前节大纲"));

        section.section_outline = Some("1 背景 (800字)");
        assert!(section.build().contains("当前节大纲：\n1 背景 (800字)"));
    }
}
