// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use url::Url;

use crate::domain::models::search_result::SearchHit;
use crate::domain::search::engine::Platform;

/// 统计参数前缀，比较URL时忽略
const TRACKING_PARAMS: &[&str] = &["utm_", "fbclid", "gclid", "ref_src", "si"];

/// 从推文URL提取ID
pub fn tweet_id(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/status/")?;
    let id: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    (!id.is_empty()).then_some(id)
}

/// 从 YouTube URL 提取视频ID
pub fn video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    let id = match host {
        "youtu.be" => parsed.path_segments()?.next().map(str::to_string),
        "youtube.com" => {
            if parsed.path() == "/watch" {
                parsed
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned())
            } else {
                let mut segments = parsed.path_segments()?;
                match segments.next() {
                    Some("shorts") | Some("embed") | Some("live") => segments.next().map(str::to_string),
                    _ => None,
                }
            }
        }
        _ => None,
    }?;

    (!id.is_empty()).then_some(id)
}

/// URL 规范化
///
/// 去掉片段和统计参数、主机名小写、去掉末尾斜杠
pub fn normalize_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw.trim()) else {
        return raw.trim().trim_end_matches('/').to_lowercase();
    };
    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| {
            let key: &str = k;
            !TRACKING_PARAMS
                .iter()
                .any(|p| key == *p || (p.ends_with('_') && key.starts_with(p)))
        })
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    url.to_string().trim_end_matches('/').to_string()
}

/// 去重键：社交平台按内容ID，其他按规范化URL
pub fn dedup_key(hit: &SearchHit) -> String {
    let content_id = match hit.platform {
        Platform::TwitterDork => tweet_id(&hit.url).map(|id| format!("tweet:{}", id)),
        Platform::YouTubeDork => video_id(&hit.url).map(|id| format!("video:{}", id)),
        Platform::GoogleDork | Platform::DuckDuckGo => None,
    };
    content_id.unwrap_or_else(|| normalize_url(&hit.url))
}

/// 按去重键保留首次出现的命中
pub fn dedupe_hits(hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| seen.insert(dedup_key(hit)))
        .collect()
}
