// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::engines::traits::{EngineError, FetchRequest, FetchResponse, PageFetcher};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

/// 缓存的会话客户端上限，超出后整体清空
const MAX_CACHED_SESSIONS: usize = 32;

/// 抓取引擎
///
/// 基于reqwest实现的HTTP引擎。每个会话一个独立客户端，
/// cookie 在会话内保持，轮换后随旧客户端一起丢弃。
#[derive(Default)]
pub struct ReqwestEngine {
    clients: Mutex<HashMap<Uuid, reqwest::Client>>,
}

impl ReqwestEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn client_for(&self, session_id: Uuid) -> Result<reqwest::Client, EngineError> {
        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(&session_id) {
            return Ok(client.clone());
        }

        let client = reqwest::Client::builder().cookie_store(true).build()?;
        if clients.len() >= MAX_CACHED_SESSIONS {
            clients.clear();
        }
        clients.insert(session_id, client.clone());
        Ok(client)
    }
}

#[async_trait]
impl PageFetcher for ReqwestEngine {
    /// 执行HTTP请求
    ///
    /// # 参数
    ///
    /// * `request` - 页面请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 任意状态码的响应
    /// * `Err(EngineError)` - 连接失败或超时
    async fn fetch_page(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        let mut headers = HeaderMap::new();
        for (k, v) in &request.headers {
            if let (Ok(k), Ok(v)) = (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(v),
            ) {
                headers.insert(k, v);
            }
        }
        if let Ok(ua) = HeaderValue::from_str(&request.user_agent) {
            headers.insert(USER_AGENT, ua);
        }

        let client = self.client_for(request.session_id)?;

        let start = Instant::now();
        let response = client
            .get(&request.url)
            .headers(headers)
            .timeout(request.timeout)
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or("text/html")
            .to_string();

        let mut response_headers = HashMap::new();
        for (k, v) in response.headers() {
            if let Ok(v_str) = v.to_str() {
                response_headers.insert(k.as_str().to_string(), v_str.to_string());
            }
        }

        let content = response.text().await?;

        Ok(FetchResponse {
            status_code,
            content,
            content_type,
            headers: response_headers,
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
