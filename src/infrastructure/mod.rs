// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 领域接口的具体技术实现，负责与外部系统交互。
///
/// 包含的子模块：
/// - 发现（discovery）：证书透明度、DNS爆破、历史快照、被动DNS API及其聚合
/// - 指标（metrics）：Prometheus 指标导出
/// - 仓库实现（repositories）：内容记录的内存与文件存储
/// - 搜索（search）：搜索引擎 dork 查询与结果解析
/// - 服务（services）：运行事件发布
pub mod discovery;
pub mod metrics;
pub mod repositories;
pub mod search;
pub mod services;
