// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 运行上下文与侦察流水线
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置、环境变量以及种子/字典/白名单数据文件
pub mod config;

/// 领域模块
///
/// 包含核心实体、提取与质量服务以及仓库、发现、平台接口
pub mod domain;

/// 引擎模块
///
/// HTTP 抓取引擎、身份池、封禁检测与自适应请求调控器
pub mod engines;

/// 基础设施模块
///
/// 发现技术、搜索平台、记录仓库、事件发布与指标导出
pub mod infrastructure;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
