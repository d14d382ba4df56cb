// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::domain::models::run_event::RunEvent;
use crate::domain::services::event_publisher::EventPublisher;

/// 丢弃所有事件
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _event: RunEvent) {}
}

/// 以结构化日志输出事件
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

impl EventPublisher for TracingPublisher {
    fn publish(&self, event: RunEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(target: "reconrs::events", event = %payload, "运行事件"),
            Err(e) => debug!(error = %e, "事件序列化失败"),
        }
    }
}

/// 把事件推送到 tokio 通道
///
/// 接收端关闭后事件被静默丢弃，不影响运行
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: UnboundedSender<RunEvent>,
}

impl ChannelPublisher {
    pub fn new(sender: UnboundedSender<RunEvent>) -> Self {
        Self { sender }
    }

    /// 创建发布者及对应的接收端
    pub fn channel() -> (Self, UnboundedReceiver<RunEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl EventPublisher for ChannelPublisher {
    fn publish(&self, event: RunEvent) {
        if self.sender.send(event).is_err() {
            debug!("事件接收端已关闭");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_channel_publisher_delivers_in_order() {
        let (publisher, mut receiver) = ChannelPublisher::channel();
        let run_id = Uuid::new_v4();

        publisher.publish(RunEvent::RunStarted {
            run_id,
            seeds: vec!["example.gov".to_string()],
        });
        publisher.publish(RunEvent::RunCompleted {
            run_id,
            accepted: 0,
            cancelled: false,
        });

        assert!(matches!(receiver.try_recv(), Ok(RunEvent::RunStarted { .. })));
        assert!(matches!(
            receiver.try_recv(),
            Ok(RunEvent::RunCompleted { accepted: 0, .. })
        ));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_closed_receiver_is_ignored() {
        let (publisher, receiver) = ChannelPublisher::channel();
        drop(receiver);
        publisher.publish(RunEvent::RunCompleted {
            run_id: Uuid::new_v4(),
            accepted: 1,
            cancelled: true,
        });
    }

    #[test]
    fn test_publishers_are_object_safe() {
        let publishers: Vec<Box<dyn EventPublisher>> =
            vec![Box::new(NoopPublisher), Box::new(TracingPublisher)];
        for publisher in publishers {
            publisher.publish(RunEvent::RunStarted {
                run_id: Uuid::new_v4(),
                seeds: Vec::new(),
            });
        }
    }
}
