// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

use crate::domain::models::content_record::{ContentRecord, MediaKind, MediaReference};
use crate::domain::services::quality_service::fingerprint;
use crate::utils::text_processing::{collapse_whitespace, truncate_chars};
use crate::utils::url_utils::resolve_web_link;

/// 不计入正文的元素
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// 块级元素，边界处的文本之间补空格
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "html", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// 视为文档的扩展名
const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx"];

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("static selector"));
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("static selector"));
static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[content]").expect("static selector"));
static HEADINGS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("static selector"));
static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("static selector"));
static IMAGES: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").expect("static selector"));
static VIDEOS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("video[src], video source[src]").expect("static selector")
});
static AUDIO: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("audio[src], audio source[src]").expect("static selector")
});

/// 提取上限
///
/// 超出部分直接截断，不做摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionLimits {
    /// 正文最大字符数
    pub max_text_chars: usize,
    /// 最大链接数
    pub max_links: usize,
    /// 最大标题数
    pub max_headings: usize,
    /// 最大媒体引用数
    pub max_media: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_text_chars: 10_000,
            max_links: 50,
            max_headings: 20,
            max_media: 30,
        }
    }
}

/// 提取服务
///
/// 把原始 HTML 解析为结构化的内容记录。纯函数：不访问网络、不读时间、
/// 不依赖外部可变状态，相同输入总是得到相同记录。
#[derive(Debug, Clone, Default)]
pub struct ExtractionService {
    limits: ExtractionLimits,
}

impl ExtractionService {
    pub fn new(limits: ExtractionLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ExtractionLimits {
        &self.limits
    }

    /// 解析 HTML 为未评估的内容记录
    ///
    /// # 参数
    ///
    /// * `html` - 原始 HTML
    /// * `source_url` - 页面URL，用于解析相对链接
    pub fn parse(&self, html: &str, source_url: &str) -> ContentRecord {
        let document = Html::parse_document(html);
        let base = Url::parse(source_url).ok();

        let domain = base
            .as_ref()
            .and_then(|u| u.host_str())
            .map(|h| h.to_lowercase())
            .unwrap_or_default();

        let title = document
            .select(&TITLE)
            .next()
            .map(|t| collapse_whitespace(&t.text().collect::<String>()))
            .unwrap_or_default();

        let text = truncate_chars(&extract_text(&document), self.limits.max_text_chars);

        let headings = document
            .select(&HEADINGS)
            .map(|h| collapse_whitespace(&h.text().collect::<Vec<_>>().join(" ")))
            .filter(|h| !h.is_empty())
            .take(self.limits.max_headings)
            .collect();

        let (links, documents) = extract_links(&document, base.as_ref());
        let links = links.into_iter().take(self.limits.max_links).collect();

        let media = extract_media(&document, base.as_ref(), documents, self.limits.max_media);

        ContentRecord {
            url: source_url.to_string(),
            domain,
            title,
            meta_description: extract_meta_description(&document),
            fingerprint: fingerprint(&text),
            text,
            headings,
            links,
            media,
            quality_score: None,
            accepted: None,
        }
    }
}

/// 收集正文文本，跳过 script/style 等元素
///
/// 同一块级元素内的文本直接拼接，块级边界和 `<br>` 处补空格，
/// 避免 `hel<b>lo</b>` 被拆成两个词
fn extract_text(document: &Html) -> String {
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut text = String::new();
    let mut previous_block = None;

    for node in root.descendants() {
        let Node::Text(piece) = node.value() else {
            continue;
        };

        let mut block = None;
        let mut skipped = false;
        for ancestor in node.ancestors() {
            if let Node::Element(e) = ancestor.value() {
                if SKIPPED_TAGS.contains(&e.name()) {
                    skipped = true;
                    break;
                }
                if block.is_none() && BLOCK_TAGS.contains(&e.name()) {
                    block = Some(ancestor.id());
                }
            }
        }
        if skipped {
            continue;
        }

        let block = block.unwrap_or_else(|| root.id());
        let after_break = node
            .prev_sibling()
            .is_some_and(|sibling| matches!(sibling.value(), Node::Element(e) if e.name() == "br"));
        if previous_block.is_some_and(|prev| prev != block) || after_break {
            text.push(' ');
        }
        text.push_str(piece);
        previous_block = Some(block);
    }

    collapse_whitespace(&text)
}

fn extract_meta_description(document: &Html) -> String {
    let mut og_description = None;

    for meta in document.select(&META) {
        let element = meta.value();
        let content = element.attr("content").unwrap_or_default();

        if element
            .attr("name")
            .is_some_and(|n| n.eq_ignore_ascii_case("description"))
        {
            return collapse_whitespace(content);
        }
        if og_description.is_none()
            && element
                .attr("property")
                .is_some_and(|p| p.eq_ignore_ascii_case("og:description"))
        {
            og_description = Some(collapse_whitespace(content));
        }
    }

    og_description.unwrap_or_default()
}

/// 返回 (去重后的出站链接, 文档类媒体)
fn extract_links(document: &Html, base: Option<&Url>) -> (Vec<String>, Vec<MediaReference>) {
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    let mut documents = Vec::new();

    for anchor in document.select(&LINKS) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_web_link(base, href) else {
            continue;
        };
        let resolved_str = resolved.to_string();
        if !seen.insert(resolved_str.clone()) {
            continue;
        }

        let path = resolved.path().to_lowercase();
        if DOCUMENT_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            documents.push(MediaReference {
                kind: MediaKind::Document,
                url: resolved_str.clone(),
                alt_text: String::new(),
                title: element_text(anchor),
            });
        }

        links.push(resolved_str);
    }

    (links, documents)
}

fn extract_media(
    document: &Html,
    base: Option<&Url>,
    documents: Vec<MediaReference>,
    max_media: usize,
) -> Vec<MediaReference> {
    let mut seen = HashSet::new();
    let mut media = Vec::new();

    let sources = [
        (&*IMAGES, MediaKind::Image),
        (&*VIDEOS, MediaKind::Video),
        (&*AUDIO, MediaKind::Audio),
    ];

    for (selector, kind) in sources {
        for element in document.select(selector) {
            let attrs = element.value();
            let Some(url) = attrs.attr("src").and_then(|src| resolve_web_link(base, src)) else {
                continue;
            };
            let url = url.to_string();
            if !seen.insert((kind, url.clone())) {
                continue;
            }
            media.push(MediaReference {
                kind,
                url,
                alt_text: attrs.attr("alt").map(collapse_whitespace).unwrap_or_default(),
                title: attrs.attr("title").map(collapse_whitespace).unwrap_or_default(),
            });
        }
    }

    for doc in documents {
        if seen.insert((MediaKind::Document, doc.url.clone())) {
            media.push(doc);
        }
    }

    media.truncate(max_media);
    media
}

fn element_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
#[path = "extraction_service_test.rs"]
mod tests;
