// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;

/// 折叠空白字符为单个空格并去除首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 小写 + 空白折叠，用于指纹与相似度计算
pub fn normalize_for_comparison(text: &str) -> String {
    collapse_whitespace(&text.to_lowercase())
}

/// 按空白切分的小写词集合
pub fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// 按字符数截断，保证不会切断 UTF-8 字符
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("海军新闻", 3), "海军新");
    }

    #[test]
    fn test_token_set_is_case_insensitive() {
        let set = token_set("Navy navy NAVY fleet");
        assert_eq!(set.len(), 2);
        assert!(set.contains("navy"));
    }
}
