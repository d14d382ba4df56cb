// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::read_body;
use crate::domain::discovery::technique::DiscoveryTechnique;
use crate::domain::models::candidate_target::{SeedDomain, TechniqueKind};
use crate::utils::errors::DiscoveryError;

pub const WAYBACK_URL: &str = "https://web.archive.org";

/// 历史归档快照（Wayback CDX）
///
/// 返回归档中出现过的原始URL，主机名由合并步骤统一剥离
pub struct ArchiveSnapshot {
    client: reqwest::Client,
    base_url: String,
    limit: usize,
}

impl ArchiveSnapshot {
    pub fn new(client: reqwest::Client, base_url: &str, limit: usize) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
        }
    }
}

/// 解析 CDX JSON 输出
///
/// 第一行是列名，之后每行第一列是原始URL；空正文表示没有快照
fn parse_cdx(body: &str) -> Result<Vec<String>, DiscoveryError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<Vec<String>> = serde_json::from_str(body)
        .map_err(|e| DiscoveryError::InvalidPayload(format!("wayback: {}", e)))?;

    Ok(rows
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .filter(|original| original != "original")
        .collect())
}

#[async_trait]
impl DiscoveryTechnique for ArchiveSnapshot {
    async fn discover(
        &self,
        domain: &SeedDomain,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, DiscoveryError> {
        if cancel.is_cancelled() {
            return Ok(Vec::new());
        }

        let limit = self.limit.to_string();
        let response = self
            .client
            .get(format!("{}/cdx/search/cdx", self.base_url))
            .query(&[
                ("url", format!("*.{}", domain.as_str()).as_str()),
                ("output", "json"),
                ("fl", "original"),
                ("collapse", "urlkey"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        parse_cdx(&read_body(response).await?)
    }

    fn kind(&self) -> TechniqueKind {
        TechniqueKind::ArchiveSnapshot
    }
}
