// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::run_event::RunEvent;

/// 运行事件发布者特质
///
/// 进度报告的观察者接口。发布不能阻塞也不能失败，
/// 传输层的问题由实现自行吞掉并记录。
pub trait EventPublisher: Send + Sync {
    /// 发布一个事件
    fn publish(&self, event: RunEvent);
}
