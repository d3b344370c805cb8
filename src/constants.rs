//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Recursive generation constants
pub mod generation {
    /// Maximum word budget a leaf section may carry before it is split
    /// into a sub-outline instead of being generated in one request
    pub const PART_LENGTH: u32 = 1000;

    /// Default limit on nested sub-outline requests for one section
    pub const MAX_SPLIT_DEPTH: usize = 3;

    /// Separator between sibling contents of a main-outline internal node
    pub const SECTION_SEPARATOR: &str = "\n\n";

    /// Separator between sibling contents inside a sub-outline
    pub const SUBSECTION_SEPARATOR: &str = "\n";

    /// Upper bound requested for a generated report summary (characters)
    pub const SUMMARY_MAX_CHARS: u32 = 200;
}

/// Outline rendering constants
pub mod outline {
    /// Indentation added per nesting level by `OutlineNode::to_text`
    pub const INDENT: &str = "    ";

    /// Prefix used by `OutlineNode::to_simple_text`
    pub const SIMPLE_PREFIX: &str = "- ";

    /// Unit suffix of a word annotation, e.g. `(1000字)`
    pub const WORD_UNIT: &str = "字";
}

/// Target-script character counting
pub mod script {
    /// First code point counted (CJK Unified Ideographs)
    pub const RANGE_START: char = '\u{4e00}';

    /// Last code point counted (CJK Unified Ideographs)
    pub const RANGE_END: char = '\u{9fff}';
}

/// Document export constants
pub mod export {
    /// Default output directory for exported reports
    pub const DEFAULT_OUTPUT_DIR: &str = "output";

    /// Default file name prefix for exported reports
    pub const DEFAULT_FILE_PREFIX: &str = "report";

    /// Heading text of the summary block
    pub const SUMMARY_HEADING: &str = "摘要";

    /// Timestamp format embedded in exported file names
    pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Default maximum tokens per generation request
    pub const DEFAULT_MAX_TOKENS: usize = 4096;
}
