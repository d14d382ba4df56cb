// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 目标发现实现
///
/// - 证书透明度（cert_transparency）：crt.sh 与 CertSpotter
/// - DNS 爆破（dns_bruteforce）：字典 + 有界并发解析
/// - 历史归档（archive）：Wayback CDX
/// - 被动 API（passive_api）：HackerTarget
/// - 聚合（aggregator）：并发执行、隔离失败、合并结果
pub mod aggregator;
pub mod archive;
pub mod cert_transparency;
pub mod dns_bruteforce;
pub mod passive_api;

use crate::utils::errors::DiscoveryError;
use std::time::Duration;

const DISCOVERY_USER_AGENT: &str = "Mozilla/5.0 (compatible; reconrs/0.1)";

/// 发现技术共用的 HTTP 客户端
pub fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(DISCOVERY_USER_AGENT)
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// 读取响应正文，非 2xx 视为上游错误
async fn read_body(response: reqwest::Response) -> Result<String, DiscoveryError> {
    let status = response.status();
    if !status.is_success() {
        return Err(DiscoveryError::UpstreamStatus(status.as_u16()));
    }
    Ok(response.text().await?)
}
