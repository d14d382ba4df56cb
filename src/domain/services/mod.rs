// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 事件发布（event_publisher）：运行进度的观察者接口
/// - 提取服务（extraction_service）：HTML 到内容记录的纯解析
/// - 质量服务（quality_service）：质量评分、指纹与去重
pub mod event_publisher;
pub mod extraction_service;
pub mod quality_service;
