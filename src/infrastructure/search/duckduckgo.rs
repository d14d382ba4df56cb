// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::domain::models::search_result::SearchHit;
use crate::domain::search::engine::Platform;
use crate::utils::text_processing::collapse_whitespace;

pub const DUCKDUCKGO_URL: &str = "https://html.duckduckgo.com";

static RESULT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.result").expect("static selector"));
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__a").expect("static selector"));
static SNIPPET: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result__snippet").expect("static selector"));

/// 构造 HTML 版搜索页URL
pub fn search_url(base_url: &str, query: &str) -> String {
    format!(
        "{}/html/?q={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(query)
    )
}

/// 还原 DuckDuckGo 跳转链接
///
/// `//duckduckgo.com/l/?uddg=<encoded>&rut=...` 取出 uddg 参数
pub fn clean_result_url(href: &str) -> Option<String> {
    let href = href.trim();
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };
    let parsed = Url::parse(&absolute).ok()?;

    if parsed.path().starts_with("/l/") {
        let target = parsed
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())?;
        return target.starts_with("http").then_some(target);
    }
    matches!(parsed.scheme(), "http" | "https").then_some(absolute)
}

/// 解析 DuckDuckGo HTML 结果页
pub fn parse_results(html: &str, query: &str, limit: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let mut hits: Vec<SearchHit> = Vec::new();

    for container in document.select(&RESULT) {
        let Some(link) = container.select(&TITLE_LINK).next() else {
            continue;
        };
        let Some(url) = link.value().attr("href").and_then(clean_result_url) else {
            continue;
        };
        if hits.iter().any(|h| h.url == url) {
            continue;
        }

        let title = collapse_whitespace(&link.text().collect::<String>());
        let snippet = container
            .select(&SNIPPET)
            .next()
            .map(|s| collapse_whitespace(&s.text().collect::<Vec<_>>().join(" ")))
            .filter(|s| !s.is_empty());

        hits.push(SearchHit {
            url,
            title,
            snippet,
            platform: Platform::DuckDuckGo,
            query: query.to_string(),
        });
        if hits.len() >= limit {
            break;
        }
    }

    debug!(count = hits.len(), "DuckDuckGo 结果解析完成");
    hits
}
