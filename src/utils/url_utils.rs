// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 解析链接：有基准URL时按基准解析，否则只接受绝对URL
///
/// 只保留 http/https 结果，`javascript:`、`mailto:` 等一律丢弃
pub fn resolve_web_link(base_url: Option<&Url>, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let resolved = match base_url {
        Some(base) => resolve_url(base, href).ok()?,
        None => Url::parse(href).ok()?,
    };

    if is_web_url(&resolved) {
        Some(resolved)
    } else {
        None
    }
}

/// 是否为带主机名的 http/https URL
pub fn is_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
}

/// 字符串形式的 URL 校验
pub fn is_valid_web_url(raw: &str) -> bool {
    Url::parse(raw).map(|u| is_web_url(&u)).unwrap_or(false)
}

/// 提取小写主机名
pub fn host_of(raw: &str) -> Option<String> {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}
