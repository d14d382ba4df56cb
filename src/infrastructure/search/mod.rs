// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 搜索平台模块
///
/// 提供 Google、DuckDuckGo 以及基于 Google 的 Twitter/YouTube dork 搜索，
/// 包括查询模板、结果页解析、命中去重和统一的平台客户端
pub mod deduplicator;
pub mod dorks;
pub mod duckduckgo;
pub mod google;
pub mod platform_client;

pub use dorks::DorkType;
pub use platform_client::{PlatformClient, PlatformEndpoints};
