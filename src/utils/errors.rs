// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::content_record::ContentRecord;
use thiserror::Error;
use uuid::Uuid;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("序列化错误: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("数据已存在: {0}")]
    AlreadyExists(String),
}

/// 发现技术错误类型
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("网络错误: {0}")]
    Network(#[from] reqwest::Error),

    #[error("上游返回状态码 {0}")]
    UpstreamStatus(u16),

    #[error("上游响应无法解析: {0}")]
    InvalidPayload(String),

    #[error("上游API拒绝请求: {0}")]
    Rejected(String),

    #[error("所有数据源均失败")]
    AllSourcesFailed,

    #[error("技术执行超时")]
    Timeout,
}

/// 未能写入仓库的已接受记录
#[derive(Debug)]
pub struct UnsavedRecord {
    pub url: String,
    pub record: Box<ContentRecord>,
    pub source: anyhow::Error,
}

/// 侦察运行错误类型
///
/// 运行循环中只有持久化失败会向调用方冒泡，其余故障都在循环内部被吸收。
#[derive(Error, Debug)]
pub enum RunError {
    /// 每条抓取流的写入失败都会收集在这里，已接受的记录不会丢失
    #[error("持久化失败: {} 条已接受记录未保存", .failures.len())]
    Persistence {
        failures: Vec<UnsavedRecord>,
        /// 失败前已保存记录的存储ID
        stored_ids: Vec<Uuid>,
    },
}
