// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use reconrs::engines::governor::{GovernorConfig, RequestGovernor};
use reconrs::engines::identity::IdentityPool;
use reconrs::engines::traits::{EngineError, FetchRequest, FetchResponse, PageFetcher};
use reconrs::infrastructure::discovery::dns_bruteforce::HostResolver;
use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 只解析固定主机名的假 DNS
pub struct StubResolver {
    known: HashSet<String>,
}

impl StubResolver {
    pub fn new(known: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            known: known.iter().map(|h| h.to_string()).collect(),
        })
    }
}

#[async_trait]
impl HostResolver for StubResolver {
    async fn resolve(&self, hostname: &str) -> std::io::Result<Vec<IpAddr>> {
        if self.known.contains(hostname) {
            Ok(vec![IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10))])
        } else {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "NXDOMAIN"))
        }
    }
}

/// 对所有URL返回同一页面的假引擎
pub struct StaticPageFetcher {
    body: String,
    calls: AtomicUsize,
}

impl StaticPageFetcher {
    pub fn new(body: String) -> Arc<Self> {
        Arc::new(Self {
            body,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticPageFetcher {
    async fn fetch_page(&self, _request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FetchResponse {
            status_code: 200,
            content: self.body.clone(),
            content_type: "text/html; charset=utf-8".to_string(),
            headers: HashMap::new(),
            response_time_ms: 5,
        })
    }

    fn name(&self) -> &'static str {
        "static_page"
    }
}

/// 没有延迟、不冷却的调控器配置
pub fn fast_config() -> GovernorConfig {
    GovernorConfig {
        min_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        max_requests_per_session: 10,
        cooldown_min: Duration::ZERO,
        cooldown_max: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
    }
}

pub fn fast_governor(fetcher: Arc<dyn PageFetcher>) -> Arc<RequestGovernor> {
    Arc::new(RequestGovernor::new(fetcher, IdentityPool::default(), fast_config()))
}

/// 大约 `words` 个词的干净文章页面
pub fn clean_article_html(words: usize) -> String {
    let mut paragraphs = Vec::new();
    let mut count = 0;
    let mut n = 0;
    while count < words {
        let sentence = format!(
            "Report {} notes that the regional harbor authority completed scheduled maintenance on berth cranes and published revised arrival windows for cargo vessels.",
            n
        );
        count += sentence.split_whitespace().count();
        paragraphs.push(format!("<p>{}</p>", sentence));
        n += 1;
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Harbor Authority Maintenance Bulletin</title>
    <meta name="description" content="Weekly maintenance and arrival window updates">
</head>
<body>
    <h1>Maintenance Bulletin</h1>
    <h2>Berth operations</h2>
    {}
    <a href="/bulletins/archive">Previous bulletins</a>
    <img src="/img/berth.jpg" alt="Berth cranes at dawn">
</body>
</html>"#,
        paragraphs.join("\n    ")
    )
}
