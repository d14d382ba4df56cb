// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::debug;

use crate::domain::models::content_record::{ContentRecord, MediaKind};
use crate::utils::text_processing::{normalize_for_comparison, token_set};
use crate::utils::url_utils::is_valid_web_url;

const TEXT_WEIGHT: f64 = 0.5;
const MEDIA_WEIGHT: f64 = 0.2;
const STRUCTURE_WEIGHT: f64 = 0.3;

/// 没有媒体时的中性分
const NEUTRAL_MEDIA_SCORE: f64 = 50.0;
const MAX_TEXT_CHARS: usize = 50_000;
const MIN_WORDS: usize = 10;
const SPAM_CAPS_RATIO: f64 = 0.5;
const SPAM_PHRASE_FLAG: usize = 3;

/// 计算内容指纹
///
/// 小写并折叠空白后的 SHA-256 十六进制串，跨进程稳定
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_for_comparison(text).as_bytes());
    hex::encode(hasher.finalize())
}

/// Jaccard 相似度
///
/// 任意一侧为空时返回 0
pub fn similarity(a: &str, b: &str) -> f64 {
    jaccard(&token_set(a), &token_set(b))
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// 质量过滤配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// 接受阈值
    pub acceptance_threshold: f64,
    /// 近似重复阈值
    pub near_duplicate_threshold: f64,
    /// 正文最短长度
    pub min_text_length: usize,
    /// 垃圾短语出现次数 / 词数 的上限
    pub spam_density_threshold: f64,
    /// 大写字母比例上限
    pub caps_ratio_threshold: f64,
    /// 垃圾短语
    pub spam_phrases: Vec<String>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 30.0,
            near_duplicate_threshold: 0.8,
            min_text_length: 50,
            spam_density_threshold: 0.05,
            caps_ratio_threshold: 0.3,
            spam_phrases: [
                "click here",
                "buy now",
                "limited time",
                "act now",
                "act fast",
                "free money",
                "guaranteed",
                "no risk",
                "call now",
                "urgent",
                "exclusive",
                "special offer",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// 质量报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub text_score: f64,
    pub media_score: f64,
    pub structure_score: f64,
    /// 加权总分
    pub score: f64,
    /// 是否判定为垃圾内容
    pub spam: bool,
    pub issues: Vec<String>,
}

/// 评估结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    LowQuality,
    Spam,
    ExactDuplicate,
    NearDuplicate,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accepted => "accepted",
            Verdict::LowQuality => "low_quality",
            Verdict::Spam => "spam",
            Verdict::ExactDuplicate => "exact_duplicate",
            Verdict::NearDuplicate => "near_duplicate",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单条记录的评估结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub score: f64,
    pub accepted: bool,
    pub verdict: Verdict,
}

/// 质量与去重过滤器
///
/// 保存本次运行中已接受记录的指纹和词集合，先到先得。
/// 多个抓取流共享同一个过滤器时由调用方加锁。
#[derive(Debug)]
pub struct QualityFilter {
    config: QualityConfig,
    /// 按词边界匹配的垃圾短语，不区分大小写
    spam_patterns: Vec<Regex>,
    fingerprints: HashSet<String>,
    accepted_tokens: Vec<HashSet<String>>,
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self::new(QualityConfig::default())
    }
}

impl QualityFilter {
    pub fn new(config: QualityConfig) -> Self {
        let spam_patterns = config
            .spam_phrases
            .iter()
            .filter(|phrase| !phrase.trim().is_empty())
            .filter_map(|phrase| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase.trim()))).ok())
            .collect();
        Self {
            config,
            spam_patterns,
            fingerprints: HashSet::new(),
            accepted_tokens: Vec::new(),
        }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// 已接受的记录数
    pub fn accepted_count(&self) -> usize {
        self.fingerprints.len()
    }

    /// 计算质量报告，不修改任何状态
    pub fn assess(&self, record: &ContentRecord) -> QualityReport {
        let mut issues = Vec::new();
        let text = self.text_quality(&record.text, &mut issues);
        let media_score = media_quality(record, &mut issues);
        let structure_score = structure_quality(record, &mut issues);

        let score = TEXT_WEIGHT * text.score
            + MEDIA_WEIGHT * media_score
            + STRUCTURE_WEIGHT * structure_score;

        QualityReport {
            text_score: text.score,
            media_score,
            structure_score,
            score,
            spam: text.spam_phrases >= SPAM_PHRASE_FLAG || text.caps_ratio > SPAM_CAPS_RATIO,
            issues,
        }
    }

    /// 评估记录并写入评分与接受标记
    ///
    /// 记录只应评估一次；被接受的记录进入去重内存
    ///
    /// # 参数
    ///
    /// * `record` - 提取服务生成的未评估记录
    ///
    /// # 返回值
    ///
    /// 分数、是否接受以及结论
    pub fn evaluate(&mut self, record: &mut ContentRecord) -> Evaluation {
        debug_assert!(!record.is_evaluated(), "record evaluated twice");

        let report = self.assess(record);
        let tokens = token_set(&record.text);

        let verdict = if report.spam {
            Verdict::Spam
        } else if report.score < self.config.acceptance_threshold {
            Verdict::LowQuality
        } else if self.fingerprints.contains(&record.fingerprint) {
            Verdict::ExactDuplicate
        } else if self
            .accepted_tokens
            .iter()
            .any(|seen| jaccard(seen, &tokens) >= self.config.near_duplicate_threshold)
        {
            Verdict::NearDuplicate
        } else {
            Verdict::Accepted
        };

        let accepted = verdict == Verdict::Accepted;
        if accepted {
            self.fingerprints.insert(record.fingerprint.clone());
            self.accepted_tokens.push(tokens);
        }

        record.quality_score = Some(report.score);
        record.accepted = Some(accepted);

        counter!("quality_evaluations_total", "verdict" => verdict.as_str()).increment(1);
        debug!(
            url = %record.url,
            score = report.score,
            verdict = %verdict,
            issues = ?report.issues,
            "记录评估完成"
        );

        Evaluation {
            score: report.score,
            accepted,
            verdict,
        }
    }

    fn text_quality(&self, text: &str, issues: &mut Vec<String>) -> TextQuality {
        if text.trim().is_empty() {
            issues.push("No text content".to_string());
            return TextQuality::default();
        }

        let mut score: f64 = 100.0;
        let char_count = text.chars().count();
        let words = text.split_whitespace().count();

        if char_count < self.config.min_text_length {
            issues.push("Text too short".to_string());
            score -= 60.0;
        }
        if words < MIN_WORDS {
            issues.push("Too few words".to_string());
            score -= 25.0;
        }
        if char_count > MAX_TEXT_CHARS {
            issues.push("Text unusually long".to_string());
            score -= 10.0;
        }

        if repetition_ratio(text) < 0.8 {
            issues.push("High content repetition".to_string());
            score -= 20.0;
        }

        let mut distinct = 0;
        let mut occurrences = 0;
        for pattern in &self.spam_patterns {
            let hits = pattern.find_iter(text).count();
            if hits > 0 {
                distinct += 1;
                occurrences += hits;
            }
        }
        let density = occurrences as f64 / words.max(1) as f64;
        if density > self.config.spam_density_threshold || distinct > 2 {
            issues.push("Possible spam content".to_string());
            score -= 40.0;
        }

        let caps = caps_ratio(text);
        if caps > self.config.caps_ratio_threshold {
            issues.push("Excessive capitalization".to_string());
            score -= 20.0;
        }

        TextQuality {
            score: score.clamp(0.0, 100.0),
            spam_phrases: distinct,
            caps_ratio: caps,
        }
    }
}

#[derive(Debug, Default)]
struct TextQuality {
    score: f64,
    spam_phrases: usize,
    caps_ratio: f64,
}

/// 不重复句子占比，没有句子时为 1
fn repetition_ratio(text: &str) -> f64 {
    let sentences: Vec<String> = text
        .split(['.', '!', '?'])
        .map(normalize_for_comparison)
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        return 1.0;
    }
    let unique: HashSet<&String> = sentences.iter().collect();
    unique.len() as f64 / sentences.len() as f64
}

/// 大写字母占全部字母的比例
fn caps_ratio(text: &str) -> f64 {
    let (upper, alphabetic) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(u, a), c| {
            (u + usize::from(c.is_uppercase()), a + 1)
        });
    if alphabetic == 0 {
        0.0
    } else {
        upper as f64 / alphabetic as f64
    }
}

fn media_quality(record: &ContentRecord, issues: &mut Vec<String>) -> f64 {
    if record.media.is_empty() {
        return NEUTRAL_MEDIA_SCORE;
    }

    let mut score: f64 = 100.0;
    let total = record.media.len();
    let valid = record
        .media
        .iter()
        .filter(|m| is_valid_web_url(&m.url))
        .count();

    let invalid = total - valid;
    if invalid > 0 {
        issues.push(format!("{} invalid media URLs", invalid));
        score -= 5.0 * invalid as f64;
    }
    if (valid as f64) < total as f64 * 0.8 {
        issues.push("Many media URLs are invalid".to_string());
        score -= 20.0;
    }

    let images: Vec<_> = record.media_of(MediaKind::Image).collect();
    if !images.is_empty() {
        let with_alt = images.iter().filter(|m| !m.alt_text.trim().is_empty()).count();
        if (with_alt as f64) < images.len() as f64 * 0.5 {
            issues.push("Most images lack alt text".to_string());
            score -= 15.0;
        }
    }

    score.clamp(0.0, 100.0)
}

fn structure_quality(record: &ContentRecord, issues: &mut Vec<String>) -> f64 {
    let mut score: f64 = 100.0;

    if record.title.trim().is_empty() {
        issues.push("Missing title".to_string());
        score -= 25.0;
    }
    if record.meta_description.trim().is_empty() {
        issues.push("Missing meta description".to_string());
        score -= 15.0;
    }
    if record.headings.is_empty() {
        issues.push("No headings".to_string());
        score -= 20.0;
    }
    if record.links.is_empty() {
        issues.push("No links".to_string());
        score -= 15.0;
    }
    if !is_valid_web_url(&record.url) {
        issues.push("Malformed source URL".to_string());
        score -= 25.0;
    }

    score.clamp(0.0, 100.0)
}

#[cfg(test)]
#[path = "quality_service_test.rs"]
mod tests;
