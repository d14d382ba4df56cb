// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// 发现技术类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueKind {
    /// 证书透明度日志
    CertificateTransparency,
    /// DNS 字典爆破
    DnsBruteForce,
    /// 历史归档快照
    ArchiveSnapshot,
    /// 被动 API 查询
    PassiveApi,
}

impl TechniqueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TechniqueKind::CertificateTransparency => "certificate_transparency",
            TechniqueKind::DnsBruteForce => "dns_brute_force",
            TechniqueKind::ArchiveSnapshot => "archive_snapshot",
            TechniqueKind::PassiveApi => "passive_api",
        }
    }
}

impl fmt::Display for TechniqueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 种子域名
///
/// 运行开始时提供，构造时即完成规范化，之后不可变
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeedDomain(String);

impl SeedDomain {
    /// 创建种子域名，规范化后为空或非法时返回 None
    pub fn parse(raw: &str) -> Option<Self> {
        normalize_hostname(raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 候选目标
///
/// 每个规范化主机名只创建一次，记录发现它的全部技术
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTarget {
    /// 规范化后的主机名
    pub hostname: String,
    /// 贡献该主机名的发现技术
    pub techniques: BTreeSet<TechniqueKind>,
}

impl CandidateTarget {
    pub fn new(hostname: String, technique: TechniqueKind) -> Self {
        let mut techniques = BTreeSet::new();
        techniques.insert(technique);
        Self {
            hostname,
            techniques,
        }
    }

    /// 合并另一条同主机名记录的技术标签
    pub fn absorb(&mut self, other: &CandidateTarget) {
        self.techniques.extend(other.techniques.iter().copied());
    }

    /// 用于内容抓取的入口URL
    pub fn url(&self) -> String {
        format!("https://{}/", self.hostname)
    }
}

/// 规范化主机名
///
/// 去除首尾空白、转小写、剥离 URL 协议与路径、去掉前导通配符 `*.`
/// 和末尾的点。结果不是合法主机名时返回 None。
pub fn normalize_hostname(raw: &str) -> Option<String> {
    let mut host = raw.trim().to_lowercase();

    if let Some(idx) = host.find("://") {
        host = host[idx + 3..].to_string();
    }
    if let Some(idx) = host.find(&['/', '?', '#'][..]) {
        host.truncate(idx);
    }
    if let Some(idx) = host.rfind('@') {
        host = host[idx + 1..].to_string();
    }
    if let Some(idx) = host.find(':') {
        host.truncate(idx);
    }

    while let Some(rest) = host.strip_prefix("*.") {
        host = rest.to_string();
    }
    let host = host.trim_start_matches('.').trim_end_matches('.');

    if is_valid_hostname(host) {
        Some(host.to_string())
    } else {
        None
    }
}

fn is_valid_hostname(host: &str) -> bool {
    if host.is_empty() || host.len() > 253 {
        return false;
    }
    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

/// 主机名是否属于种子域名（规范化子串匹配）
///
/// 用于剔除第三方数据源带来的误报
pub fn matches_seed(hostname: &str, seed: &SeedDomain) -> bool {
    hostname.contains(seed.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_wildcard_case_and_trailing_dot() {
        assert_eq!(
            normalize_hostname("*.Portal.Example.GOV.").as_deref(),
            Some("portal.example.gov")
        );
        assert_eq!(
            normalize_hostname("  www.example.gov\n").as_deref(),
            Some("www.example.gov")
        );
        assert_eq!(
            normalize_hostname("*.*.example.gov").as_deref(),
            Some("example.gov")
        );
    }

    #[test]
    fn test_normalize_strips_url_parts() {
        assert_eq!(
            normalize_hostname("https://api.example.gov:8443/v1?x=1").as_deref(),
            Some("api.example.gov")
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert_eq!(normalize_hostname(""), None);
        assert_eq!(normalize_hostname("*."), None);
        assert_eq!(normalize_hostname("bad host.example.gov"), None);
        assert_eq!(normalize_hostname("-lead.example.gov"), None);
    }

    #[test]
    fn test_matches_seed() {
        let seed = SeedDomain::parse("Example.gov.").unwrap();
        assert_eq!(seed.as_str(), "example.gov");
        assert!(matches_seed("mail.example.gov", &seed));
        assert!(!matches_seed("example.com", &seed));
    }

    #[test]
    fn test_absorb_merges_techniques() {
        let mut a = CandidateTarget::new("www.example.gov".into(), TechniqueKind::DnsBruteForce);
        let b = CandidateTarget::new("www.example.gov".into(), TechniqueKind::PassiveApi);
        a.absorb(&b);
        assert_eq!(a.techniques.len(), 2);
        assert_eq!(a.url(), "https://www.example.gov/");
    }
}
