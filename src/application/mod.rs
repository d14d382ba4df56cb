// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 运行上下文与侦察用例，把领域服务和基础设施编排成一次完整运行
pub mod context;
pub mod use_cases;
