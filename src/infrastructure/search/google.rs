// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::domain::models::search_result::SearchHit;
use crate::domain::search::engine::Platform;
use crate::utils::text_processing::collapse_whitespace;

pub const GOOGLE_URL: &str = "https://www.google.com";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

// 结果容器，按顺序尝试
static CONTAINER_STRATEGIES: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    vec![
        ("div.g", selector("div.g")),
        ("data-hveid", selector("div[data-hveid]")),
        ("jscontroller", selector("div[jscontroller*='SC7lYd']")),
    ]
});
static TITLE: Lazy<Selector> = Lazy::new(|| selector("h3"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static SNIPPETS: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector("[data-sncf], div[data-snc]"),
        selector("span.aCOpRe, span.st, div.st"),
        selector("div[class*='VwiC3b'], div[class*='snippet']"),
    ]
});

/// 构造搜索页URL
pub fn search_url(base_url: &str, query: &str, num: usize) -> String {
    format!(
        "{}/search?q={}&num={}&hl=en",
        base_url.trim_end_matches('/'),
        urlencoding::encode(query),
        num
    )
}

/// 还原 Google 跳转链接
///
/// `/url?q=<target>&sa=...` 取出并解码 target；其他站内相对路径丢弃
pub fn clean_result_url(href: &str) -> Option<String> {
    let href = href.trim();
    if let Some(rest) = href
        .strip_prefix("/url?q=")
        .or_else(|| href.strip_prefix("/url?url="))
    {
        let encoded = rest.split('&').next().unwrap_or_default();
        let decoded = urlencoding::decode(encoded).ok()?.into_owned();
        return decoded.starts_with("http").then_some(decoded);
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    None
}

/// 解析 Google 结果页
///
/// 容器选择器逐个尝试，全部落空时退回到“包含 h3 的链接”
pub fn parse_results(html: &str, query: &str, platform: Platform, limit: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);

    let mut containers: Vec<ElementRef> = Vec::new();
    let mut used_strategy = "a > h3";
    for (name, strategy) in CONTAINER_STRATEGIES.iter() {
        containers = document.select(strategy).collect();
        if !containers.is_empty() {
            used_strategy = *name;
            break;
        }
    }

    let mut hits: Vec<SearchHit> = Vec::new();
    let mut push = |hit: SearchHit| {
        if !hits.iter().any(|h| h.url == hit.url) {
            hits.push(hit);
        }
    };

    if containers.is_empty() {
        for anchor in document.select(&LINK) {
            if let Some(hit) = hit_from_anchor(anchor, None, query, platform) {
                push(hit);
            }
        }
    } else {
        for container in containers {
            let Some(anchor) = container
                .select(&LINK)
                .find(|a| a.select(&TITLE).next().is_some())
                .or_else(|| container.select(&LINK).next())
            else {
                continue;
            };
            if let Some(hit) = hit_from_anchor(anchor, Some(container), query, platform) {
                push(hit);
            }
        }
    }

    if hits.is_empty() {
        warn!(strategy = used_strategy, "Google 结果页没有解析出结果");
    } else {
        debug!(strategy = used_strategy, count = hits.len(), "Google 结果解析完成");
    }
    hits.truncate(limit);
    hits
}

fn hit_from_anchor(
    anchor: ElementRef,
    container: Option<ElementRef>,
    query: &str,
    platform: Platform,
) -> Option<SearchHit> {
    let title = anchor
        .select(&TITLE)
        .next()
        .or_else(|| container.and_then(|c| c.select(&TITLE).next()))
        .map(|h3| collapse_whitespace(&h3.text().collect::<String>()))
        .filter(|t| !t.is_empty())?;

    let url = clean_result_url(anchor.value().attr("href")?)?;

    let snippet = container.and_then(|c| {
        SNIPPETS.iter().find_map(|s| {
            c.select(s)
                .next()
                .map(|e| collapse_whitespace(&e.text().collect::<Vec<_>>().join(" ")))
                .filter(|t| !t.is_empty())
        })
    });

    Some(SearchHit {
        url,
        title,
        snippet,
        platform,
        query: query.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_result_url() {
        assert_eq!(
            clean_result_url("/url?q=https://www.navy.mil/news%3Fid%3D7&sa=U&ved=x").as_deref(),
            Some("https://www.navy.mil/news?id=7")
        );
        assert_eq!(
            clean_result_url("https://example.gov/a").as_deref(),
            Some("https://example.gov/a")
        );
        assert_eq!(clean_result_url("/search?q=next"), None);
        assert_eq!(clean_result_url("/url?q=javascript:void(0)"), None);
    }

    #[test]
    fn test_parse_classic_div_g_layout() {
        let html = r#"
            <html><body>
              <div class="g">
                <a href="/url?q=https://www.navy.mil/Press-Office/&sa=U"><h3>Navy Press Office</h3></a>
                <span class="st">Official releases from the press office.</span>
              </div>
              <div class="g">
                <a href="https://www.defense.gov/News/"><h3>Defense   News</h3></a>
                <div data-sncf="1">Latest defense news.</div>
              </div>
              <div class="g">
                <a href="https://www.defense.gov/News/"><h3>Duplicate</h3></a>
              </div>
              <div class="g"><a href="/preferences">Settings</a></div>
            </body></html>"#;

        let hits = parse_results(html, "navy news", Platform::GoogleDork, 10);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://www.navy.mil/Press-Office/");
        assert_eq!(hits[0].title, "Navy Press Office");
        assert_eq!(
            hits[0].snippet.as_deref(),
            Some("Official releases from the press office.")
        );
        assert_eq!(hits[1].title, "Defense News");
        assert_eq!(hits[1].snippet.as_deref(), Some("Latest defense news."));
        assert!(hits.iter().all(|h| h.query == "navy news"));
    }

    #[test]
    fn test_falls_back_to_heading_links() {
        let html = r#"<main><a href="https://example.gov/x"><h3>Example</h3></a><a href="https://example.gov/y">No heading</a></main>"#;
        let hits = parse_results(html, "q", Platform::TwitterDork, 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].platform, Platform::TwitterDork);
        assert!(hits[0].snippet.is_none());
    }

    #[test]
    fn test_limit_truncates() {
        let mut html = String::new();
        for i in 0..10 {
            html.push_str(&format!(
                r#"<div class="g"><a href="https://example.gov/{}"><h3>T{}</h3></a></div>"#,
                i, i
            ));
        }
        assert_eq!(parse_results(&html, "q", Platform::GoogleDork, 3).len(), 3);
    }

    #[test]
    fn test_search_url_encodes_query() {
        assert_eq!(
            search_url("http://127.0.0.1:8080/", "\"navy\" site:gov", 20),
            "http://127.0.0.1:8080/search?q=%22navy%22%20site%3Agov&num=20&hl=en"
        );
    }
}
