// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::candidate_target::{SeedDomain, TechniqueKind};
use crate::utils::errors::DiscoveryError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// 发现技术特质
///
/// 返回原始主机名，规范化与过滤由发现引擎统一完成。
/// 每个技术只计算私有结果，不写共享状态。
#[async_trait]
pub trait DiscoveryTechnique: Send + Sync {
    /// 针对种子域名执行发现
    async fn discover(
        &self,
        domain: &SeedDomain,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, DiscoveryError>;

    /// 技术类型
    fn kind(&self) -> TechniqueKind;
}
