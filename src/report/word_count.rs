//! Target-script character counting
//!
//! Progress reports state how much prose a section actually produced. Only
//! CJK ideographs are counted; punctuation, Latin text and whitespace are not.

use crate::constants::script::{RANGE_END, RANGE_START};

/// Number of target-script characters in `text`
pub fn count_target_chars(text: &str) -> usize {
    text.chars()
        .filter(|c| (RANGE_START..=RANGE_END).contains(c))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_target_chars() {
        assert_eq!(count_target_chars(""), 0);
        assert_eq!(count_target_chars("Hello, world! 123"), 0);
        assert_eq!(count_target_chars("，。！？：；（）"), 0);
    }

    #[test]
    fn test_mixed_script() {
        assert_eq!(count_target_chars("数字孪生 (Digital Twin) 技术。"), 6);
        assert_eq!(count_target_chars("AI驱动的\n水务管理"), 7);
    }

    #[test]
    fn test_range_bounds() {
        assert_eq!(count_target_chars("\u{4e00}\u{9fff}"), 2);
        assert_eq!(count_target_chars("\u{4dff}\u{a000}"), 0);
    }

    proptest! {
        #[test]
        fn prop_latin_padding_does_not_change_count(s in "[\u{4e00}-\u{9fff}]{0,50}", pad in "[a-zA-Z0-9 .,!]{0,20}") {
            let padded = format!("{}{}{}", pad, s, pad);
            prop_assert_eq!(count_target_chars(&padded), s.chars().count());
        }
    }
}
