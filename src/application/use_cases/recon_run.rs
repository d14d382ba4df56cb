// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::context::{RunContext, StatsSnapshot};
use crate::domain::models::candidate_target::{CandidateTarget, SeedDomain};
use crate::domain::models::run_event::RunEvent;
use crate::domain::models::trusted_domains::TrustedDomains;
use crate::domain::repositories::content_record_repository::ContentRecordRepository;
use crate::domain::search::engine::PlatformCapability;
use crate::domain::services::extraction_service::ExtractionService;
use crate::domain::services::quality_service::{QualityConfig, QualityFilter};
use crate::engines::governor::RequestGovernor;
use crate::infrastructure::discovery::aggregator::{absorb_targets, DiscoveryEngine, TechniqueFailure};
use crate::utils::errors::{RepositoryError, RunError, UnsavedRecord};

/// 运行报告
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub seeds: Vec<String>,
    /// 通过白名单与数量上限后的目标
    pub targets: Vec<CandidateTarget>,
    /// 来自平台搜索的额外URL数
    pub search_urls: usize,
    pub failures: Vec<TechniqueFailure>,
    /// 已保存记录的存储ID
    pub stored_ids: Vec<Uuid>,
    pub stats: StatsSnapshot,
    /// 运行是否被取消，取消时结果不完整
    pub cancelled: bool,
}

/// 侦察流水线
///
/// 发现 → 白名单 → 抓取 → 提取 → 质量过滤 → 持久化。
/// 每个调控器是一条顺序抓取流，质量过滤器在各流之间共享。
pub struct ReconPipeline {
    discovery: DiscoveryEngine,
    governors: Vec<Arc<RequestGovernor>>,
    repository: Arc<dyn ContentRecordRepository>,
    extraction: ExtractionService,
    quality: QualityConfig,
    allowlist: Option<Arc<TrustedDomains>>,
    platforms: Vec<Arc<dyn PlatformCapability>>,
    keywords: Vec<String>,
    max_targets: usize,
}

impl ReconPipeline {
    pub fn new(
        discovery: DiscoveryEngine,
        governors: Vec<Arc<RequestGovernor>>,
        repository: Arc<dyn ContentRecordRepository>,
    ) -> Self {
        Self {
            discovery,
            governors,
            repository,
            extraction: ExtractionService::default(),
            quality: QualityConfig::default(),
            allowlist: None,
            platforms: Vec::new(),
            keywords: Vec::new(),
            max_targets: usize::MAX,
        }
    }

    pub fn with_extraction(mut self, extraction: ExtractionService) -> Self {
        self.extraction = extraction;
        self
    }

    pub fn with_quality(mut self, quality: QualityConfig) -> Self {
        self.quality = quality;
        self
    }

    /// 只抓取白名单内的目标；不设置时不过滤
    pub fn with_allowlist(mut self, allowlist: Arc<TrustedDomains>) -> Self {
        self.allowlist = Some(allowlist);
        self
    }

    /// 用关键词在各平台搜索，命中的URL加入抓取队列
    pub fn with_search(mut self, platforms: Vec<Arc<dyn PlatformCapability>>, keywords: Vec<String>) -> Self {
        self.platforms = platforms;
        self.keywords = keywords;
        self
    }

    pub fn with_max_targets(mut self, max_targets: usize) -> Self {
        self.max_targets = max_targets;
        self
    }

    /// 执行一次完整运行
    ///
    /// 取消只在工作单元之间检查，已取得的部分结果照常返回。
    ///
    /// # 参数
    ///
    /// * `seeds` - 种子域名
    /// * `ctx` - 本次运行的上下文
    ///
    /// # 返回值
    ///
    /// 运行报告；只有持久化失败会返回错误
    #[instrument(skip_all, fields(run_id = %ctx.run_id))]
    pub async fn run(&self, seeds: &[SeedDomain], ctx: &RunContext) -> Result<RunReport, RunError> {
        ctx.publish(RunEvent::RunStarted {
            run_id: ctx.run_id,
            seeds: seeds.iter().map(|s| s.to_string()).collect(),
        });
        info!(seeds = seeds.len(), "运行开始");

        let (merged, failures) = self.discover_all(seeds, ctx).await;
        let targets = self.gate_targets(merged);
        info!(targets = targets.len(), "目标筛选完成");

        let mut urls: Vec<String> = targets.iter().map(CandidateTarget::url).collect();
        let search_urls = self.search_urls(ctx, &mut urls).await;

        let stored_ids = self.fetch_all(urls, ctx).await?;

        let cancelled = ctx.is_cancelled();
        let stats = ctx.stats().snapshot();
        ctx.publish(RunEvent::RunCompleted {
            run_id: ctx.run_id,
            accepted: stats.accepted,
            cancelled,
        });
        info!(
            fetched = stats.fetched,
            accepted = stats.accepted,
            stored = stats.stored,
            cancelled,
            "运行结束"
        );

        Ok(RunReport {
            run_id: ctx.run_id,
            started_at: ctx.started_at,
            finished_at: Utc::now(),
            seeds: seeds.iter().map(|s| s.to_string()).collect(),
            targets,
            search_urls,
            failures,
            stored_ids,
            stats,
            cancelled,
        })
    }

    async fn discover_all(
        &self,
        seeds: &[SeedDomain],
        ctx: &RunContext,
    ) -> (BTreeMap<String, CandidateTarget>, Vec<TechniqueFailure>) {
        let mut merged = BTreeMap::new();
        let mut failures = Vec::new();

        for seed in seeds {
            if ctx.is_cancelled() {
                info!(domain = %seed, "运行已取消，跳过剩余种子");
                break;
            }

            let summary = self.discovery.discover(seed, ctx.cancel_token()).await;

            for (technique, hostnames) in &summary.contributions {
                ctx.publish(RunEvent::TechniqueCompleted {
                    domain: summary.domain.clone(),
                    technique: *technique,
                    hostnames: *hostnames,
                });
            }
            for failure in &summary.failures {
                ctx.publish(RunEvent::TechniqueFailed {
                    domain: summary.domain.clone(),
                    technique: failure.technique,
                    error: failure.error.clone(),
                });
            }
            ctx.publish(RunEvent::DiscoveryCompleted {
                domain: summary.domain.clone(),
                targets: summary.targets.len(),
                contributions: summary.contributions.clone(),
            });

            failures.extend(summary.failures);
            absorb_targets(&mut merged, summary.targets);
        }

        (merged, failures)
    }

    fn gate_targets(&self, merged: BTreeMap<String, CandidateTarget>) -> Vec<CandidateTarget> {
        let total = merged.len();
        let targets: Vec<CandidateTarget> = merged
            .into_values()
            .filter(|target| match &self.allowlist {
                Some(allowlist) => allowlist.is_trusted_host(&target.hostname),
                None => true,
            })
            .take(self.max_targets)
            .collect();

        if targets.len() < total {
            debug!(total, kept = targets.len(), "部分目标被白名单或上限过滤");
        }
        targets
    }

    /// 把平台搜索命中追加到URL列表，返回新增数量
    async fn search_urls(&self, ctx: &RunContext, urls: &mut Vec<String>) -> usize {
        if self.keywords.is_empty() || self.platforms.is_empty() {
            return 0;
        }

        let mut seen: HashSet<String> = urls.iter().cloned().collect();
        let before = urls.len();

        for platform in &self.platforms {
            if ctx.is_cancelled() {
                break;
            }
            for hit in platform.search(&self.keywords).await {
                let trusted = self
                    .allowlist
                    .as_ref()
                    .map_or(true, |allowlist| allowlist.is_trusted_url(&hit.url));
                if trusted && seen.insert(hit.url.clone()) {
                    urls.push(hit.url);
                }
            }
        }

        urls.len() - before
    }

    /// URL 轮流分配给各抓取流并发执行
    async fn fetch_all(&self, urls: Vec<String>, ctx: &RunContext) -> Result<Vec<Uuid>, RunError> {
        if self.governors.is_empty() {
            warn!(urls = urls.len(), "没有可用的抓取流");
            return Ok(Vec::new());
        }

        let streams = self.governors.len();
        let mut lanes: Vec<Vec<String>> = vec![Vec::new(); streams];
        for (i, url) in urls.into_iter().enumerate() {
            lanes[i % streams].push(url);
        }

        let filter = Mutex::new(QualityFilter::new(self.quality.clone()));
        let abort = ctx.cancel_token().child_token();

        let lanes = join_all(
            self.governors
                .iter()
                .zip(lanes)
                .map(|(governor, lane)| self.fetch_lane(governor, lane, &filter, &abort, ctx)),
        )
        .await;

        let mut stored_ids = Vec::new();
        let mut failures = Vec::new();
        for (stored, unsaved) in lanes {
            stored_ids.extend(stored);
            failures.extend(unsaved);
        }

        if failures.is_empty() {
            Ok(stored_ids)
        } else {
            Err(RunError::Persistence {
                failures,
                stored_ids,
            })
        }
    }

    /// 顺序处理一条抓取流，写入失败时中止所有流并交回未保存的记录
    async fn fetch_lane(
        &self,
        governor: &RequestGovernor,
        urls: Vec<String>,
        filter: &Mutex<QualityFilter>,
        abort: &CancellationToken,
        ctx: &RunContext,
    ) -> (Vec<Uuid>, Option<UnsavedRecord>) {
        let mut stored = Vec::new();

        for url in urls {
            if abort.is_cancelled() {
                break;
            }

            let Some(attempt) = governor.fetch_until_cancelled(&url, abort).await else {
                break;
            };
            ctx.stats().record_fetch(attempt.outcome);
            ctx.publish(RunEvent::FetchCompleted {
                url: url.clone(),
                outcome: attempt.outcome,
                status_code: attempt.status_code,
            });
            if !attempt.is_success() {
                continue;
            }

            let mut record = self.extraction.parse(&attempt.body, &url);
            let evaluation = filter.lock().evaluate(&mut record);
            ctx.stats().record_evaluation(evaluation.accepted);
            ctx.publish(RunEvent::RecordEvaluated {
                url: url.clone(),
                score: evaluation.score,
                accepted: evaluation.accepted,
                verdict: evaluation.verdict.to_string(),
            });
            if !evaluation.accepted {
                continue;
            }

            match self.repository.insert(&record).await {
                Ok(id) => {
                    ctx.stats().record_stored();
                    stored.push(id);
                }
                Err(e) if matches!(e.downcast_ref::<RepositoryError>(), Some(RepositoryError::AlreadyExists(_))) => {
                    debug!(url = %url, "记录已存在，跳过保存");
                }
                Err(source) => {
                    warn!(url = %url, error = %source, "记录保存失败，中止抓取");
                    abort.cancel();
                    return (
                        stored,
                        Some(UnsavedRecord {
                            url,
                            record: Box::new(record),
                            source,
                        }),
                    );
                }
            }
        }

        (stored, None)
    }
}

#[cfg(test)]
#[path = "recon_run_test.rs"]
mod tests;
