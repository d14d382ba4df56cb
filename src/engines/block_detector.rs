// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

/// 封禁页特征
static BLOCK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bcaptcha\b",
        r"(?i)g-recaptcha|hcaptcha",
        r"(?i)unusual traffic",
        r"(?i)access denied",
        r"(?i)are you a robot",
        r"(?i)verify you are (a )?human",
        r"(?i)cf-browser-verification|cf-challenge|challenge-platform",
        r"(?i)attention required!? \| cloudflare",
        r"(?i)checking your browser before accessing",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// 判断响应是否为封禁
///
/// HTTP 429 或命中任一封禁页特征
pub fn is_blocked(status_code: u16, body: &str) -> bool {
    status_code == 429 || BLOCK_PATTERNS.iter().any(|re| re.is_match(body))
}
