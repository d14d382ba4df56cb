// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：目标、会话、内容记录和运行事件
/// - 发现接口（discovery）：目标发现技术的抽象
/// - 仓库接口（repositories）：持久化抽象接口
/// - 搜索接口（search）：搜索平台能力抽象
/// - 服务（services）：提取、质量过滤和事件发布
///
/// 领域层不依赖任何外部实现。
pub mod discovery;
pub mod models;
pub mod repositories;
pub mod search;
pub mod services;
