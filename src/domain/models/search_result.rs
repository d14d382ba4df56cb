// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::domain::search::engine::Platform;

/// 搜索命中
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: Option<String>,
    pub platform: Platform,
    /// 产生该命中的 dork 查询
    pub query: String,
}
