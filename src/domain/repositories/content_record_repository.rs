// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::content_record::ContentRecord;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 查询条件
///
/// 所有字段为 AND 关系，None 表示不限制
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordCriteria {
    /// 来源主机名（精确匹配，不区分大小写）
    pub domain: Option<String>,
    /// 来源URL（精确匹配）
    pub url: Option<String>,
    /// 最低质量分
    pub min_score: Option<f64>,
    /// 标题或正文包含的文本（不区分大小写）
    pub contains: Option<String>,
}

impl RecordCriteria {
    pub fn matches(&self, record: &ContentRecord) -> bool {
        if let Some(domain) = &self.domain {
            if !record.domain.eq_ignore_ascii_case(domain) {
                return false;
            }
        }
        if let Some(url) = &self.url {
            if &record.url != url {
                return false;
            }
        }
        if let Some(min) = self.min_score {
            if record.quality_score.unwrap_or(0.0) < min {
                return false;
            }
        }
        if let Some(needle) = &self.contains {
            let needle = needle.to_lowercase();
            if !record.title.to_lowercase().contains(&needle)
                && !record.text.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// 内容记录仓库特质
///
/// 持久化后端是外部协作方，核心只依赖这个接口
#[async_trait]
pub trait ContentRecordRepository: Send + Sync {
    /// 保存已接受的记录，返回存储ID
    async fn insert(&self, record: &ContentRecord) -> Result<Uuid>;
    /// 按条件查找记录
    async fn find(&self, criteria: &RecordCriteria) -> Result<Vec<ContentRecord>>;
}
