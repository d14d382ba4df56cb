// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::content_record::ContentRecord;
use crate::domain::models::search_result::SearchHit;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 搜索平台标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    GoogleDork,
    DuckDuckGo,
    TwitterDork,
    YouTubeDork,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::GoogleDork => "google_dork",
            Platform::DuckDuckGo => "duckduckgo",
            Platform::TwitterDork => "twitter_dork",
            Platform::YouTubeDork => "youtube_dork",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google_dork" | "google" => Ok(Platform::GoogleDork),
            "duckduckgo" | "ddg" => Ok(Platform::DuckDuckGo),
            "twitter_dork" | "twitter" => Ok(Platform::TwitterDork),
            "youtube_dork" | "youtube" => Ok(Platform::YouTubeDork),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

/// 平台能力接口
///
/// 所有平台共用同一个请求调控器；失败按空结果处理
#[async_trait]
pub trait PlatformCapability: Send + Sync {
    /// 按关键词搜索
    async fn search(&self, keywords: &[String]) -> Vec<SearchHit>;

    /// 抓取并提取单个URL
    async fn fetch(&self, url: &str) -> Option<ContentRecord>;

    /// 平台标签
    fn platform(&self) -> Platform;
}
