// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::deduplicator::dedupe_hits;
use super::dorks::{dork_queries, DorkType};
use super::{duckduckgo, google};
use crate::domain::models::content_record::ContentRecord;
use crate::domain::models::search_result::SearchHit;
use crate::domain::models::trusted_domains::TrustedDomains;
use crate::domain::search::engine::{Platform, PlatformCapability};
use crate::domain::services::extraction_service::ExtractionService;
use crate::engines::governor::RequestGovernor;

/// 搜索端点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformEndpoints {
    pub google: String,
    pub duckduckgo: String,
}

impl Default for PlatformEndpoints {
    fn default() -> Self {
        Self {
            google: google::GOOGLE_URL.to_string(),
            duckduckgo: duckduckgo::DUCKDUCKGO_URL.to_string(),
        }
    }
}

/// 搜索平台客户端
///
/// 按平台标签分派查询构造与结果解析；所有请求都经过共享的调控器，
/// 任何失败都按空结果处理
pub struct PlatformClient {
    platform: Platform,
    governor: Arc<RequestGovernor>,
    extraction: ExtractionService,
    endpoints: PlatformEndpoints,
    dork_types: Vec<DorkType>,
    allowlist: Option<Arc<TrustedDomains>>,
    results_per_query: usize,
}

impl PlatformClient {
    pub fn new(platform: Platform, governor: Arc<RequestGovernor>, extraction: ExtractionService) -> Self {
        Self {
            platform,
            governor,
            extraction,
            endpoints: PlatformEndpoints::default(),
            dork_types: vec![DorkType::General],
            allowlist: None,
            results_per_query: 20,
        }
    }

    pub fn with_endpoints(mut self, endpoints: PlatformEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_dork_types(mut self, dork_types: Vec<DorkType>) -> Self {
        self.dork_types = dork_types;
        self
    }

    /// 只保留白名单内的命中
    pub fn with_allowlist(mut self, allowlist: Arc<TrustedDomains>) -> Self {
        self.allowlist = Some(allowlist);
        self
    }

    pub fn with_results_per_query(mut self, results_per_query: usize) -> Self {
        self.results_per_query = results_per_query.max(1);
        self
    }

    fn query_url(&self, query: &str) -> String {
        match self.platform {
            Platform::DuckDuckGo => duckduckgo::search_url(&self.endpoints.duckduckgo, query),
            Platform::GoogleDork | Platform::TwitterDork | Platform::YouTubeDork => {
                google::search_url(&self.endpoints.google, query, self.results_per_query)
            }
        }
    }

    fn parse(&self, html: &str, query: &str) -> Vec<SearchHit> {
        match self.platform {
            Platform::DuckDuckGo => duckduckgo::parse_results(html, query, self.results_per_query),
            Platform::GoogleDork | Platform::TwitterDork | Platform::YouTubeDork => {
                google::parse_results(html, query, self.platform, self.results_per_query)
            }
        }
    }
}

#[async_trait]
impl PlatformCapability for PlatformClient {
    #[instrument(skip(self), fields(platform = %self.platform))]
    async fn search(&self, keywords: &[String]) -> Vec<SearchHit> {
        let queries = dork_queries(self.platform, keywords, &self.dork_types);
        let mut hits = Vec::new();

        for query in &queries {
            let attempt = self.governor.fetch(&self.query_url(query)).await;
            if !attempt.is_success() {
                warn!(
                    query = %query,
                    outcome = attempt.outcome.as_str(),
                    error = ?attempt.error,
                    "搜索请求失败"
                );
                continue;
            }
            hits.extend(self.parse(&attempt.body, query));
        }

        let mut hits = dedupe_hits(hits);
        if let Some(allowlist) = &self.allowlist {
            hits.retain(|hit| allowlist.is_trusted_url(&hit.url));
        }

        info!(queries = queries.len(), hits = hits.len(), "搜索完成");
        hits
    }

    async fn fetch(&self, url: &str) -> Option<ContentRecord> {
        let attempt = self.governor.fetch(url).await;
        if !attempt.is_success() {
            warn!(url, outcome = attempt.outcome.as_str(), "内容抓取失败");
            return None;
        }
        Some(self.extraction.parse(&attempt.body, url))
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}

#[cfg(test)]
#[path = "platform_client_test.rs"]
mod tests;
