// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::read_body;
use crate::domain::discovery::technique::DiscoveryTechnique;
use crate::domain::models::candidate_target::{SeedDomain, TechniqueKind};
use crate::utils::errors::DiscoveryError;

pub const HACKERTARGET_URL: &str = "https://api.hackertarget.com";

/// 被动 API 查询（HackerTarget hostsearch）
pub struct PassiveApi {
    client: reqwest::Client,
    base_url: String,
}

impl PassiveApi {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// 解析 `host,ip` 行
///
/// 上游用纯文本报告错误（如配额耗尽），这种情况视为技术失败
fn parse_hostsearch(body: &str) -> Result<Vec<String>, DiscoveryError> {
    let trimmed = body.trim();
    let lower = trimmed.to_lowercase();
    if lower.starts_with("error") || lower.contains("api count exceeded") {
        return Err(DiscoveryError::Rejected(trimmed.to_string()));
    }

    Ok(trimmed
        .lines()
        .filter_map(|line| line.split(',').next())
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .collect())
}

#[async_trait]
impl DiscoveryTechnique for PassiveApi {
    async fn discover(
        &self,
        domain: &SeedDomain,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, DiscoveryError> {
        if cancel.is_cancelled() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(format!("{}/hostsearch/", self.base_url))
            .query(&[("q", domain.as_str())])
            .send()
            .await?;

        parse_hostsearch(&read_body(response).await?)
    }

    fn kind(&self) -> TechniqueKind {
        TechniqueKind::PassiveApi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_hostsearch_lines() {
        let body = "www.example.gov,192.0.2.1\nmail.example.gov,192.0.2.2\n\n";
        assert_eq!(
            parse_hostsearch(body).unwrap(),
            vec!["www.example.gov", "mail.example.gov"]
        );
    }

    #[test]
    fn test_api_error_lines_are_rejections() {
        assert!(matches!(
            parse_hostsearch("API count exceeded - Increase Quota with Membership"),
            Err(DiscoveryError::Rejected(_))
        ));
        assert!(matches!(
            parse_hostsearch("error check your search parameter"),
            Err(DiscoveryError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_discover_against_stub() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hostsearch/"))
            .and(query_param("q", "example.gov"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ns1.example.gov,192.0.2.9"))
            .mount(&server)
            .await;

        let technique = PassiveApi::new(reqwest::Client::new(), &server.uri());
        let found = technique
            .discover(&SeedDomain::parse("example.gov").unwrap(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(found, vec!["ns1.example.gov"]);
    }
}
