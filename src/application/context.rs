// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::models::fetch::FetchOutcome;
use crate::domain::models::run_event::RunEvent;
use crate::domain::services::event_publisher::EventPublisher;

/// 运行计数器
#[derive(Debug, Default)]
pub struct RunStats {
    fetched: AtomicUsize,
    succeeded: AtomicUsize,
    blocked: AtomicUsize,
    errors: AtomicUsize,
    evaluated: AtomicUsize,
    accepted: AtomicUsize,
    stored: AtomicUsize,
}

/// 计数器快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub fetched: usize,
    pub succeeded: usize,
    pub blocked: usize,
    pub errors: usize,
    pub evaluated: usize,
    pub accepted: usize,
    pub stored: usize,
}

impl RunStats {
    pub fn record_fetch(&self, outcome: FetchOutcome) {
        self.fetched.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            FetchOutcome::Success => &self.succeeded,
            FetchOutcome::Blocked => &self.blocked,
            FetchOutcome::Error => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evaluation(&self, accepted: bool) {
        self.evaluated.fetch_add(1, Ordering::Relaxed);
        if accepted {
            self.accepted.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_stored(&self) {
        self.stored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            fetched: self.fetched.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            evaluated: self.evaluated.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
        }
    }
}

/// 单次运行的上下文
///
/// 每次运行创建一个，运行结束即丢弃
pub struct RunContext {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    cancel: CancellationToken,
    publisher: Arc<dyn EventPublisher>,
    stats: RunStats,
}

impl RunContext {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self::with_cancel(CancellationToken::new(), publisher)
    }

    /// 使用外部取消令牌（如 Ctrl-C 处理器持有的令牌）
    pub fn with_cancel(cancel: CancellationToken, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            cancel,
            publisher,
            stats: RunStats::default(),
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn publish(&self, event: RunEvent) {
        self.publisher.publish(event);
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }
}
