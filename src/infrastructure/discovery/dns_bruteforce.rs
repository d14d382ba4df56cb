// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::discovery::technique::DiscoveryTechnique;
use crate::domain::models::candidate_target::{SeedDomain, TechniqueKind};
use crate::utils::errors::DiscoveryError;

/// 默认字典
pub const DEFAULT_WORDLIST: &[&str] = &[
    "www", "mail", "ftp", "localhost", "webmail", "smtp", "pop", "ns1", "webdisk", "ns2",
    "cpanel", "whm", "autodiscover", "autoconfig", "m", "imap", "test", "ns", "blog", "pop3",
    "dev", "www2", "admin", "forum", "news", "vpn", "ns3", "mail2", "new", "mysql", "old",
    "lists", "support", "mobile", "mx", "static", "docs", "beta", "shop", "sql", "secure",
    "demo", "cp", "calendar", "wiki", "web", "media", "email", "images", "img",
];

/// 主机名解析接口
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// 解析主机名，返回地址列表
    async fn resolve(&self, hostname: &str) -> std::io::Result<Vec<IpAddr>>;
}

/// 基于 `tokio::net::lookup_host` 的系统解析器
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioResolver;

#[async_trait]
impl HostResolver for TokioResolver {
    async fn resolve(&self, hostname: &str) -> std::io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((hostname, 80)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// DNS 字典爆破
///
/// 有界并发，每个探测单独超时；超时或解析失败都视为不存在
pub struct DnsBruteForce {
    resolver: Arc<dyn HostResolver>,
    wordlist: Vec<String>,
    workers: usize,
    probe_timeout: Duration,
}

impl DnsBruteForce {
    pub fn new(
        resolver: Arc<dyn HostResolver>,
        wordlist: Vec<String>,
        workers: usize,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            wordlist,
            workers: workers.max(1),
            probe_timeout,
        }
    }

    async fn probe(&self, hostname: String, cancel: &CancellationToken) -> Option<String> {
        if cancel.is_cancelled() {
            return None;
        }
        match tokio::time::timeout(self.probe_timeout, self.resolver.resolve(&hostname)).await {
            Ok(Ok(addrs)) if !addrs.is_empty() => Some(hostname),
            Ok(Ok(_)) | Ok(Err(_)) => None,
            Err(_) => {
                debug!(hostname = %hostname, "DNS 探测超时");
                None
            }
        }
    }
}

#[async_trait]
impl DiscoveryTechnique for DnsBruteForce {
    async fn discover(
        &self,
        domain: &SeedDomain,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, DiscoveryError> {
        let hostnames: Vec<String> = self
            .wordlist
            .iter()
            .map(|word| format!("{}.{}", word, domain.as_str()))
            .collect();

        let found: Vec<String> = stream::iter(hostnames)
            .map(|hostname| self.probe(hostname, cancel))
            .buffer_unordered(self.workers)
            .filter_map(futures::future::ready)
            .collect()
            .await;

        debug!(
            domain = %domain,
            probed = self.wordlist.len(),
            resolved = found.len(),
            "DNS 爆破完成"
        );
        Ok(found)
    }

    fn kind(&self) -> TechniqueKind {
        TechniqueKind::DnsBruteForce
    }
}
