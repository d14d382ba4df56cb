// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::domain::models::candidate_target::SeedDomain;
use crate::domain::models::trusted_domains::TrustedDomains;

/// 启动期配置错误
///
/// 这些错误都是致命的，运行不会开始
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("配置加载失败: {0}")]
    Config(#[from] config::ConfigError),

    #[error("无法读取 {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} 中没有有效条目")]
    Empty(PathBuf),

    #[error("白名单格式错误 ({path}): {source}")]
    InvalidAllowlist {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn read_file(path: &Path) -> Result<String, SettingsError> {
    std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// 按行解析列表：去掉空白行和 `#` 注释
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// 加载种子域名列表
///
/// 无法规范化的条目被跳过并告警；没有任何有效种子时返回错误
pub fn load_seeds(path: &Path) -> Result<Vec<SeedDomain>, SettingsError> {
    let mut seeds: Vec<SeedDomain> = Vec::new();
    for line in parse_lines(&read_file(path)?) {
        match SeedDomain::parse(&line) {
            Some(seed) if !seeds.contains(&seed) => seeds.push(seed),
            Some(_) => {}
            None => warn!(entry = %line, "忽略无效的种子域名"),
        }
    }

    if seeds.is_empty() {
        return Err(SettingsError::Empty(path.to_path_buf()));
    }
    Ok(seeds)
}

/// 加载 DNS 爆破字典
pub fn load_wordlist(path: &Path) -> Result<Vec<String>, SettingsError> {
    let words: Vec<String> = parse_lines(&read_file(path)?)
        .into_iter()
        .map(|w| w.to_lowercase())
        .collect();

    if words.is_empty() {
        return Err(SettingsError::Empty(path.to_path_buf()));
    }
    Ok(words)
}

/// 加载可信域名白名单（JSON：类别 → 域名列表）
pub fn load_allowlist(path: &Path) -> Result<TrustedDomains, SettingsError> {
    TrustedDomains::from_json(&read_file(path)?).map_err(|source| SettingsError::InvalidAllowlist {
        path: path.to_path_buf(),
        source,
    })
}
