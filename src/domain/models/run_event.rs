// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::candidate_target::TechniqueKind;
use super::fetch::FetchOutcome;

/// 运行进度事件
///
/// 发布到外部报告通道，核心不依赖任何具体传输
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    RunStarted {
        run_id: Uuid,
        seeds: Vec<String>,
    },
    TechniqueCompleted {
        domain: String,
        technique: TechniqueKind,
        hostnames: usize,
    },
    TechniqueFailed {
        domain: String,
        technique: TechniqueKind,
        error: String,
    },
    DiscoveryCompleted {
        domain: String,
        targets: usize,
        contributions: BTreeMap<TechniqueKind, usize>,
    },
    FetchCompleted {
        url: String,
        outcome: FetchOutcome,
        status_code: Option<u16>,
    },
    RecordEvaluated {
        url: String,
        score: f64,
        accepted: bool,
        verdict: String,
    },
    RunCompleted {
        run_id: Uuid,
        accepted: usize,
        cancelled: bool,
    },
}
