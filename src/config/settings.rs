// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::services::extraction_service::ExtractionLimits;
use crate::domain::services::quality_service::QualityConfig;
use crate::engines::governor::GovernorConfig;

/// 应用程序配置设置
///
/// 包含发现、请求调控、提取、质量过滤、运行和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 发现技术配置
    pub discovery: DiscoverySettings,
    /// 请求调控配置
    pub governor: GovernorSettings,
    /// 提取上限
    pub extraction: ExtractionLimits,
    /// 质量过滤配置
    pub quality: QualityConfig,
    /// 运行配置
    pub run: RunSettings,
    /// 指标配置
    #[serde(default)]
    pub metrics: MetricsSettings,
    /// 日志配置
    pub telemetry: TelemetrySettings,
}

/// 发现技术配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    /// crt.sh 地址
    pub crtsh_url: String,
    /// CertSpotter 地址
    pub certspotter_url: String,
    /// Wayback Machine 地址
    pub wayback_url: String,
    /// HackerTarget 地址
    pub hackertarget_url: String,
    /// 历史快照最多条数
    pub wayback_limit: usize,
    /// DNS 爆破并发数
    pub dns_workers: usize,
    /// 单个 DNS 探测超时（毫秒）
    pub probe_timeout_ms: u64,
    /// 单个技术整体超时（秒）
    pub technique_timeout_secs: u64,
    /// 发现 HTTP 客户端超时（秒）
    pub http_timeout_secs: u64,
    /// 爆破字典路径，不设置时使用内置字典
    pub wordlist_path: Option<PathBuf>,
}

impl DiscoverySettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn technique_timeout(&self) -> Duration {
        Duration::from_secs(self.technique_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// 请求调控配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct GovernorSettings {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_requests_per_session: u32,
    pub cooldown_min_ms: u64,
    pub cooldown_max_ms: u64,
    pub request_timeout_ms: u64,
    /// 自定义 User-Agent 列表，为空时使用内置列表
    #[serde(default)]
    pub user_agents: Vec<String>,
}

impl GovernorSettings {
    pub fn to_config(&self) -> GovernorConfig {
        GovernorConfig {
            min_delay: Duration::from_millis(self.min_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms.max(self.min_delay_ms)),
            max_requests_per_session: self.max_requests_per_session.max(1),
            cooldown_min: Duration::from_millis(self.cooldown_min_ms),
            cooldown_max: Duration::from_millis(self.cooldown_max_ms.max(self.cooldown_min_ms)),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

/// 运行配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RunSettings {
    /// 种子域名列表文件
    pub seeds_path: PathBuf,
    /// 可信域名白名单文件，不设置时不做过滤
    pub allowlist_path: Option<PathBuf>,
    /// 最多抓取的目标数
    pub max_targets: usize,
    /// 并行抓取流数量
    pub fetch_streams: usize,
    /// 搜索关键词，为空时跳过平台搜索
    #[serde(default)]
    pub keywords: Vec<String>,
    /// 使用的搜索平台
    #[serde(default)]
    pub platforms: Vec<String>,
    /// dork 类型
    #[serde(default)]
    pub dork_types: Vec<String>,
    /// 记录输出文件，不设置时保存在内存中
    pub output_path: Option<PathBuf>,
}

/// 指标配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsSettings {
    /// Prometheus 监听地址，不设置时不导出
    pub listen_addr: Option<SocketAddr>,
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    /// 是否输出 JSON 日志
    pub json: bool,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 和 `RECONRS__*` 环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("RECONRS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("run.keywords")
                    .with_list_parse_key("run.platforms")
                    .with_list_parse_key("run.dork_types")
                    .with_list_parse_key("governor.user_agents")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// 只含内置默认值的构建器
    pub fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let extraction = ExtractionLimits::default();
        let quality = QualityConfig::default();

        Config::builder()
            // Discovery
            .set_default("discovery.crtsh_url", "https://crt.sh")?
            .set_default("discovery.certspotter_url", "https://api.certspotter.com")?
            .set_default("discovery.wayback_url", "https://web.archive.org")?
            .set_default("discovery.hackertarget_url", "https://api.hackertarget.com")?
            .set_default("discovery.wayback_limit", 100)?
            .set_default("discovery.dns_workers", 10)?
            .set_default("discovery.probe_timeout_ms", 3000)?
            .set_default("discovery.technique_timeout_secs", 120)?
            .set_default("discovery.http_timeout_secs", 30)?
            // Governor
            .set_default("governor.min_delay_ms", 1000)?
            .set_default("governor.max_delay_ms", 3000)?
            .set_default("governor.max_requests_per_session", 50)?
            .set_default("governor.cooldown_min_ms", 30_000)?
            .set_default("governor.cooldown_max_ms", 120_000)?
            .set_default("governor.request_timeout_ms", 30_000)?
            // Extraction
            .set_default("extraction.max_text_chars", extraction.max_text_chars as u64)?
            .set_default("extraction.max_links", extraction.max_links as u64)?
            .set_default("extraction.max_headings", extraction.max_headings as u64)?
            .set_default("extraction.max_media", extraction.max_media as u64)?
            // Quality
            .set_default("quality.acceptance_threshold", quality.acceptance_threshold)?
            .set_default("quality.near_duplicate_threshold", quality.near_duplicate_threshold)?
            // Run
            .set_default("run.seeds_path", "config/seeds.txt")?
            .set_default("run.max_targets", 200)?
            .set_default("run.fetch_streams", 4)?
            // Telemetry
            .set_default("telemetry.json", false)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
