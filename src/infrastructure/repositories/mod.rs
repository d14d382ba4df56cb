// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 内容记录仓库的内存实现与 JSON Lines 文件实现
pub mod jsonl_record_repo;
pub mod memory_record_repo;
