// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use metrics::counter;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::fetch::{FetchAttempt, FetchOutcome, FetchSession, SessionState};
use crate::engines::block_detector::is_blocked;
use crate::engines::identity::IdentityPool;
use crate::engines::traits::{FetchRequest, FetchResponse, PageFetcher};

/// 调控器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernorConfig {
    /// 请求前最小延迟
    pub min_delay: Duration,
    /// 请求前最大延迟
    pub max_delay: Duration,
    /// 单个会话最多请求数，达到后轮换
    pub max_requests_per_session: u32,
    /// 封禁后最短冷却
    pub cooldown_min: Duration,
    /// 封禁后最长冷却
    pub cooldown_max: Duration,
    /// 单次请求超时
    pub request_timeout: Duration,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
            max_requests_per_session: 50,
            cooldown_min: Duration::from_secs(30),
            cooldown_max: Duration::from_secs(120),
            request_timeout: Duration::from_secs(30),
        }
    }
}

struct GovernorState {
    session: FetchSession,
    cooldown_until: Option<Instant>,
    rotations: u64,
}

/// 自适应请求调控器
///
/// 一个调控器就是一条顺序抓取流：互斥锁在整个请求期间持有，
/// 同一时刻最多一个请求在途。并行抓取请创建多个调控器。
///
/// 会话状态机：
/// - ACTIVE：每次请求前随机延迟，计数达到上限后退役并换新身份
/// - COOLING_DOWN：遇到 429 或封禁页后进入，下一次请求先等冷却结束再轮换
/// - RETIRED：已被替换的会话
pub struct RequestGovernor {
    fetcher: Arc<dyn PageFetcher>,
    identities: IdentityPool,
    config: GovernorConfig,
    state: Mutex<GovernorState>,
}

impl RequestGovernor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, identities: IdentityPool, config: GovernorConfig) -> Self {
        let session = FetchSession::new(identities.random());
        Self {
            fetcher,
            identities,
            config,
            state: Mutex::new(GovernorState {
                session,
                cooldown_until: None,
                rotations: 0,
            }),
        }
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// 当前会话快照
    pub async fn current_session(&self) -> FetchSession {
        self.state.lock().await.session.clone()
    }

    pub async fn session_state(&self) -> SessionState {
        self.state.lock().await.session.state
    }

    /// 已发生的轮换次数
    pub async fn rotations(&self) -> u64 {
        self.state.lock().await.rotations
    }

    /// 抓取目标URL
    ///
    /// 不做隐式重试：BLOCKED 与 ERROR 原样返回给调用方
    ///
    /// # 参数
    ///
    /// * `target` - 目标URL
    ///
    /// # 返回值
    ///
    /// 本次抓取尝试，非 SUCCESS 时 body 为空
    #[instrument(skip(self), fields(engine = self.fetcher.name()))]
    pub async fn fetch(&self, target: &str) -> FetchAttempt {
        let mut state = self.state.lock().await;
        self.pace(&mut state).await;
        self.send(&mut state, target).await
    }

    /// 可取消的抓取
    ///
    /// 冷却和请求前延迟期间响应取消；取消时不发出请求，返回 `None`，
    /// 会话保持原状态
    #[instrument(skip(self, cancel), fields(engine = self.fetcher.name()))]
    pub async fn fetch_until_cancelled(
        &self,
        target: &str,
        cancel: &CancellationToken,
    ) -> Option<FetchAttempt> {
        let mut state = self.state.lock().await;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("已取消，放弃本次请求");
                return None;
            }
            _ = self.pace(&mut state) => {}
        }
        Some(self.send(&mut state, target).await)
    }

    /// 请求前的节奏控制：等冷却、按需轮换、随机延迟
    async fn pace(&self, state: &mut GovernorState) {
        if state.session.state == SessionState::CoolingDown {
            if let Some(until) = state.cooldown_until {
                debug!("等待冷却结束");
                tokio::time::sleep_until(until).await;
            }
            self.rotate(state);
        } else if state.session.request_count >= self.config.max_requests_per_session {
            self.rotate(state);
        }

        tokio::time::sleep(jitter(self.config.min_delay, self.config.max_delay)).await;
    }

    async fn send(&self, state: &mut GovernorState, target: &str) -> FetchAttempt {
        state.session.request_count += 1;
        let request = FetchRequest {
            url: target.to_string(),
            session_id: state.session.id,
            user_agent: state.session.identity.user_agent.clone(),
            headers: state.session.identity.headers.iter().cloned().collect(),
            timeout: self.config.request_timeout,
        };

        let timestamp = Utc::now();
        let started = Instant::now();
        let result =
            tokio::time::timeout(self.config.request_timeout, self.fetcher.fetch_page(&request))
                .await;
        let latency = started.elapsed();

        let mut attempt = FetchAttempt {
            target: target.to_string(),
            session_id: request.session_id,
            timestamp,
            outcome: FetchOutcome::Error,
            latency,
            status_code: None,
            body: String::new(),
            headers: HashMap::new(),
            error: None,
        };

        match result {
            Ok(Ok(response)) => classify(&mut attempt, response),
            Ok(Err(e)) => attempt.error = Some(e.to_string()),
            Err(_) => attempt.error = Some("request timed out".to_string()),
        }

        counter!("governor_fetch_total", "outcome" => attempt.outcome.as_str()).increment(1);

        match attempt.outcome {
            FetchOutcome::Blocked => {
                let cooldown = jitter(self.config.cooldown_min, self.config.cooldown_max);
                state.session.state = SessionState::CoolingDown;
                state.cooldown_until = Some(Instant::now() + cooldown);
                counter!("governor_cooldowns_total").increment(1);
                warn!(
                    session_id = %state.session.id,
                    status = ?attempt.status_code,
                    cooldown_ms = cooldown.as_millis() as u64,
                    "请求被封禁，进入冷却"
                );
            }
            _ => {
                if state.session.request_count >= self.config.max_requests_per_session {
                    self.rotate(state);
                }
            }
        }

        debug!(
            outcome = attempt.outcome.as_str(),
            status = ?attempt.status_code,
            latency_ms = latency.as_millis() as u64,
            "抓取完成"
        );
        attempt
    }

    fn rotate(&self, state: &mut GovernorState) {
        state.session.state = SessionState::Retired;
        let retired = state.session.id;
        let retired_requests = state.session.request_count;

        state.session = FetchSession::new(self.identities.rotate_from(&state.session.identity));
        state.cooldown_until = None;
        state.rotations += 1;

        counter!("governor_rotations_total").increment(1);
        info!(
            retired = %retired,
            retired_requests,
            session_id = %state.session.id,
            "会话已轮换"
        );
    }
}

fn classify(attempt: &mut FetchAttempt, response: FetchResponse) {
    attempt.status_code = Some(response.status_code);

    if is_blocked(response.status_code, &response.content) {
        attempt.outcome = FetchOutcome::Blocked;
        attempt.error = Some(format!("blocked (HTTP {})", response.status_code));
    } else if (200..300).contains(&response.status_code) {
        attempt.outcome = FetchOutcome::Success;
        attempt.body = response.content;
        attempt.headers = response.headers;
    } else {
        attempt.error = Some(format!("HTTP {}", response.status_code));
    }
}

/// 在 [min, max] 内取随机时长
fn jitter(min: Duration, max: Duration) -> Duration {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let lo_ms = lo.as_millis() as u64;
    let hi_ms = hi.as_millis() as u64;
    if lo_ms == hi_ms {
        return lo;
    }
    Duration::from_millis(rand::random_range(lo_ms..=hi_ms))
}

#[cfg(test)]
#[path = "governor_test.rs"]
mod tests;
