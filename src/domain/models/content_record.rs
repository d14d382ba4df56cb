// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 媒体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
}

/// 媒体引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    /// 媒体类型
    pub kind: MediaKind,
    /// 绝对URL
    pub url: String,
    /// 替代文本（无障碍）
    pub alt_text: String,
    /// 标题或链接文本
    pub title: String,
}

/// 内容记录
///
/// 由提取服务创建，质量过滤器只写入一次评分与接受标记，
/// 之后要么交给持久化层，要么被丢弃，不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// 来源URL
    pub url: String,
    /// 来源主机名
    pub domain: String,
    /// 页面标题
    pub title: String,
    /// meta 描述
    pub meta_description: String,
    /// 正文文本（已折叠空白）
    pub text: String,
    /// h1-h6 标题文本，按文档顺序
    pub headings: Vec<String>,
    /// 出站链接（绝对URL）
    pub links: Vec<String>,
    /// 媒体引用
    pub media: Vec<MediaReference>,
    /// 正文指纹
    pub fingerprint: String,
    /// 质量分数，评估前为 None
    pub quality_score: Option<f64>,
    /// 是否被接受，评估前为 None
    pub accepted: Option<bool>,
}

impl ContentRecord {
    /// 指定类型的媒体
    pub fn media_of(&self, kind: MediaKind) -> impl Iterator<Item = &MediaReference> {
        self.media.iter().filter(move |m| m.kind == kind)
    }

    pub fn is_evaluated(&self) -> bool {
        self.quality_score.is_some()
    }
}
