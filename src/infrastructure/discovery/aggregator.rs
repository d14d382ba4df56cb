// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::future::join_all;
use metrics::counter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::domain::discovery::technique::DiscoveryTechnique;
use crate::domain::models::candidate_target::{
    matches_seed, normalize_hostname, CandidateTarget, SeedDomain, TechniqueKind,
};
use crate::utils::errors::DiscoveryError;

/// 失败的技术
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechniqueFailure {
    pub technique: TechniqueKind,
    pub error: String,
}

/// 单个种子域名的发现结果
#[derive(Debug, Clone, Serialize)]
pub struct DiscoverySummary {
    pub domain: String,
    /// 按主机名排序的候选目标
    pub targets: Vec<CandidateTarget>,
    /// 每个成功技术贡献的目标数
    pub contributions: BTreeMap<TechniqueKind, usize>,
    pub failures: Vec<TechniqueFailure>,
}

/// 目标发现引擎
///
/// 所有技术并发执行，各自包一层超时；任何技术失败都只记日志、计数，
/// 按空结果参与合并
pub struct DiscoveryEngine {
    techniques: Vec<Arc<dyn DiscoveryTechnique>>,
    technique_timeout: Duration,
}

impl DiscoveryEngine {
    pub fn new(techniques: Vec<Arc<dyn DiscoveryTechnique>>, technique_timeout: Duration) -> Self {
        Self {
            techniques,
            technique_timeout,
        }
    }

    pub fn technique_kinds(&self) -> Vec<TechniqueKind> {
        self.techniques.iter().map(|t| t.kind()).collect()
    }

    /// 针对一个种子域名执行全部技术
    #[instrument(skip(self, cancel), fields(domain = %seed))]
    pub async fn discover(&self, seed: &SeedDomain, cancel: &CancellationToken) -> DiscoverySummary {
        let futures = self.techniques.iter().map(|technique| async move {
            let kind = technique.kind();
            let result =
                match tokio::time::timeout(self.technique_timeout, technique.discover(seed, cancel))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(DiscoveryError::Timeout),
                };
            (kind, result)
        });

        let mut raw = Vec::new();
        let mut failures = Vec::new();
        for (kind, result) in join_all(futures).await {
            match result {
                Ok(names) => {
                    counter!(
                        "discovery_technique_total",
                        "technique" => kind.as_str(),
                        "status" => "success"
                    )
                    .increment(1);
                    info!(technique = %kind, raw = names.len(), "发现技术完成");
                    raw.push((kind, names));
                }
                Err(e) => {
                    counter!(
                        "discovery_technique_total",
                        "technique" => kind.as_str(),
                        "status" => "failure"
                    )
                    .increment(1);
                    warn!(technique = %kind, error = %e, "发现技术失败");
                    failures.push(TechniqueFailure {
                        technique: kind,
                        error: e.to_string(),
                    });
                }
            }
        }

        let succeeded: Vec<TechniqueKind> = raw.iter().map(|(kind, _)| *kind).collect();
        let targets = merge_results(seed, raw);

        let mut contributions: BTreeMap<TechniqueKind, usize> =
            succeeded.into_iter().map(|kind| (kind, 0)).collect();
        for target in &targets {
            for kind in &target.techniques {
                *contributions.entry(*kind).or_insert(0) += 1;
            }
        }

        info!(targets = targets.len(), failures = failures.len(), "发现完成");
        DiscoverySummary {
            domain: seed.to_string(),
            targets,
            contributions,
            failures,
        }
    }
}

/// 合并各技术的原始主机名
///
/// 规范化、剔除不含种子域名的结果、拒绝非法主机名，
/// 并按主机名合并技术标签。结果按主机名排序，重复合并结果不变。
pub fn merge_results(
    seed: &SeedDomain,
    results: Vec<(TechniqueKind, Vec<String>)>,
) -> Vec<CandidateTarget> {
    let mut merged: BTreeMap<String, CandidateTarget> = BTreeMap::new();

    for (kind, names) in results {
        for raw in names {
            let Some(hostname) = normalize_hostname(&raw) else {
                continue;
            };
            if !matches_seed(&hostname, seed) {
                continue;
            }
            merged
                .entry(hostname.clone())
                .and_modify(|target| {
                    target.techniques.insert(kind);
                })
                .or_insert_with(|| CandidateTarget::new(hostname, kind));
        }
    }

    merged.into_values().collect()
}

/// 把一批候选目标并入运行级集合
pub fn absorb_targets(into: &mut BTreeMap<String, CandidateTarget>, targets: Vec<CandidateTarget>) {
    for target in targets {
        match into.get_mut(&target.hostname) {
            Some(existing) => existing.absorb(&target),
            None => {
                into.insert(target.hostname.clone(), target);
            }
        }
    }
}

#[cfg(test)]
#[path = "aggregator_test.rs"]
mod tests;
