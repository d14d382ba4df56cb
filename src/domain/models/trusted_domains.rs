// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::url_utils::host_of;

/// 可信域名白名单
///
/// JSON 格式为 `分类 -> 域名列表`。以 `.` 开头的条目按后缀匹配
/// （如 `.gov`），其余条目按子串匹配。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustedDomains {
    categories: BTreeMap<String, Vec<String>>,
}

impl TrustedDomains {
    pub fn new(categories: BTreeMap<String, Vec<String>>) -> Self {
        let categories = categories
            .into_iter()
            .map(|(category, entries)| {
                let entries = entries
                    .into_iter()
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect();
                (category, entries)
            })
            .collect();
        Self { categories }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let categories: BTreeMap<String, Vec<String>> = serde_json::from_str(raw)?;
        Ok(Self::new(categories))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(|entries| entries.is_empty())
    }

    /// 条目总数
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// 主机名是否可信
    pub fn is_trusted_host(&self, host: &str) -> bool {
        let host = host.trim().trim_end_matches('.').to_lowercase();
        if host.is_empty() {
            return false;
        }
        self.categories.values().flatten().any(|entry| {
            if entry.starts_with('.') {
                host.ends_with(entry.as_str())
            } else {
                host.contains(entry.as_str())
            }
        })
    }

    /// URL 的主机名是否可信，无法解析的 URL 不可信
    pub fn is_trusted_url(&self, url: &str) -> bool {
        host_of(url)
            .map(|host| self.is_trusted_host(&host))
            .unwrap_or(false)
    }
}
