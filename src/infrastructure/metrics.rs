// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 安装 Prometheus 导出器并注册指标说明
///
/// 端口被占用等安装失败只记录警告，不影响运行
pub fn init_metrics(addr: SocketAddr) {
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_counter!(
        "governor_fetch_total",
        "Fetch attempts issued by request governors, by outcome"
    );
    describe_counter!(
        "governor_rotations_total",
        "Fetch sessions retired and replaced with a new identity"
    );
    describe_counter!(
        "governor_cooldowns_total",
        "Sessions that entered cool-down after a block"
    );
    describe_counter!(
        "discovery_technique_total",
        "Discovery technique executions, by technique and status"
    );
    describe_counter!(
        "quality_evaluations_total",
        "Content records evaluated by the quality filter, by verdict"
    );

    info!("Metrics exporter listening on {}", addr);
}
