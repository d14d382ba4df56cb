// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::search::engine::Platform;

/// Dork 模板分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DorkType {
    General,
    Social,
    News,
    Technical,
}

impl DorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DorkType::General => "general",
            DorkType::Social => "social",
            DorkType::News => "news",
            DorkType::Technical => "technical",
        }
    }

    fn templates(&self) -> &'static [&'static str] {
        match self {
            DorkType::General => &[
                "\"{kw}\" filetype:pdf",
                "\"{kw}\" site:edu",
                "\"{kw}\" site:gov",
                "\"{kw}\" intitle:\"{kw}\"",
                "\"{kw}\" -site:facebook.com -site:twitter.com",
            ],
            DorkType::Social => &[
                "\"{kw}\" site:twitter.com",
                "\"{kw}\" site:reddit.com",
                "\"{kw}\" site:linkedin.com",
                "\"{kw}\" site:youtube.com",
            ],
            DorkType::News => &[
                "\"{kw}\" site:reuters.com",
                "\"{kw}\" site:bbc.com",
                "\"{kw}\" site:apnews.com",
                "\"{kw}\" intitle:news",
            ],
            DorkType::Technical => &[
                "\"{kw}\" site:stackoverflow.com",
                "\"{kw}\" site:github.com",
                "\"{kw}\" filetype:json",
                "\"{kw}\" inurl:api",
            ],
        }
    }
}

impl fmt::Display for DorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DorkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(DorkType::General),
            "social" => Ok(DorkType::Social),
            "news" => Ok(DorkType::News),
            "technical" => Ok(DorkType::Technical),
            other => Err(format!("unknown dork type: {}", other)),
        }
    }
}

const TWITTER_TEMPLATES: &[&str] = &[
    "site:twitter.com \"{kw}\"",
    "site:x.com \"{kw}\"",
    "site:twitter.com inurl:status \"{kw}\"",
    "\"twitter.com\" \"{kw}\" -inurl:login -inurl:signup",
    "site:twitter.com \"{first}\" OR site:x.com \"{first}\"",
];

const YOUTUBE_TEMPLATES: &[&str] = &[
    "site:youtube.com \"{kw}\"",
    "site:youtube.com inurl:watch \"{kw}\"",
    "site:youtube.com intitle:\"{kw}\"",
    "\"youtube.com/watch\" \"{kw}\"",
];

/// 生成 dork 查询
///
/// 关键词用空格拼接后填入模板；没有关键词时返回空列表。
/// Google/DuckDuckGo 按 `dork_types` 取模板，Twitter/YouTube 使用各自的站点模板。
pub fn dork_queries(platform: Platform, keywords: &[String], dork_types: &[DorkType]) -> Vec<String> {
    let keywords: Vec<&str> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    let Some(first) = keywords.first().copied() else {
        return Vec::new();
    };
    let joined = keywords.join(" ");

    let templates: Vec<&str> = match platform {
        Platform::GoogleDork | Platform::DuckDuckGo => {
            let types = if dork_types.is_empty() {
                &[DorkType::General][..]
            } else {
                dork_types
            };
            types.iter().flat_map(|t| t.templates().iter().copied()).collect()
        }
        Platform::TwitterDork => TWITTER_TEMPLATES.to_vec(),
        Platform::YouTubeDork => YOUTUBE_TEMPLATES.to_vec(),
    };

    let mut queries: Vec<String> = Vec::with_capacity(templates.len());
    for template in templates {
        let query = template.replace("{kw}", &joined).replace("{first}", first);
        if !queries.contains(&query) {
            queries.push(query);
        }
    }
    queries
}
