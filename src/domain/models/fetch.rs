// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// 正常发起请求
    Active,
    /// 被封禁后的冷却期
    CoolingDown,
    /// 已轮换下线
    Retired,
}

/// 会话身份（模拟的客户端指纹）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// User-Agent
    pub user_agent: String,
    /// 额外请求头
    pub headers: Vec<(String, String)>,
}

/// 抓取会话
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSession {
    /// 会话ID
    pub id: Uuid,
    /// 会话身份
    pub identity: SessionIdentity,
    /// 已发起的请求数
    pub request_count: u32,
    /// 当前状态
    pub state: SessionState,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl FetchSession {
    pub fn new(identity: SessionIdentity) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            request_count: 0,
            state: SessionState::Active,
            created_at: Utc::now(),
        }
    }
}

/// 抓取结果分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    Success,
    Blocked,
    Error,
}

impl FetchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchOutcome::Success => "success",
            FetchOutcome::Blocked => "blocked",
            FetchOutcome::Error => "error",
        }
    }
}

/// 单次抓取尝试
///
/// 只在内存中流转，不做持久化。非 SUCCESS 时 body 为空。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchAttempt {
    /// 目标URL
    pub target: String,
    /// 发起请求的会话
    pub session_id: Uuid,
    /// 发起时间
    pub timestamp: DateTime<Utc>,
    /// 结果分类
    pub outcome: FetchOutcome,
    /// 请求耗时
    pub latency: Duration,
    /// HTTP状态码（网络错误时没有）
    pub status_code: Option<u16>,
    /// 响应内容
    pub body: String,
    /// 响应头
    pub headers: HashMap<String, String>,
    /// 错误描述
    pub error: Option<String>,
}

impl FetchAttempt {
    pub fn is_success(&self) -> bool {
        self.outcome == FetchOutcome::Success
    }
}
