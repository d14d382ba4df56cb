// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::read_body;
use crate::domain::discovery::technique::DiscoveryTechnique;
use crate::domain::models::candidate_target::{SeedDomain, TechniqueKind};
use crate::utils::errors::DiscoveryError;

pub const CRTSH_URL: &str = "https://crt.sh";
pub const CERTSPOTTER_URL: &str = "https://api.certspotter.com";

#[derive(Debug, Deserialize)]
struct CrtShEntry {
    #[serde(default)]
    name_value: String,
}

#[derive(Debug, Deserialize)]
struct Issuance {
    #[serde(default)]
    dns_names: Vec<String>,
}

/// 证书透明度日志
///
/// 两个数据源独立查询，只有全部失败时技术才算失败
pub struct CertTransparency {
    client: reqwest::Client,
    crtsh_url: String,
    certspotter_url: String,
}

impl CertTransparency {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_endpoints(client, CRTSH_URL, CERTSPOTTER_URL)
    }

    pub fn with_endpoints(client: reqwest::Client, crtsh_url: &str, certspotter_url: &str) -> Self {
        Self {
            client,
            crtsh_url: crtsh_url.trim_end_matches('/').to_string(),
            certspotter_url: certspotter_url.trim_end_matches('/').to_string(),
        }
    }

    async fn query_crtsh(&self, domain: &str) -> Result<Vec<String>, DiscoveryError> {
        let response = self
            .client
            .get(format!("{}/", self.crtsh_url))
            .query(&[("q", format!("%.{}", domain).as_str()), ("output", "json")])
            .send()
            .await?;
        let body = read_body(response).await?;

        let entries: Vec<CrtShEntry> = serde_json::from_str(&body)
            .map_err(|e| DiscoveryError::InvalidPayload(format!("crt.sh: {}", e)))?;

        Ok(entries
            .into_iter()
            .flat_map(|entry| {
                entry
                    .name_value
                    .split('\n')
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    async fn query_certspotter(&self, domain: &str) -> Result<Vec<String>, DiscoveryError> {
        let response = self
            .client
            .get(format!("{}/v1/issuances", self.certspotter_url))
            .query(&[
                ("domain", domain),
                ("include_subdomains", "true"),
                ("expand", "dns_names"),
            ])
            .send()
            .await?;
        let body = read_body(response).await?;

        let issuances: Vec<Issuance> = serde_json::from_str(&body)
            .map_err(|e| DiscoveryError::InvalidPayload(format!("certspotter: {}", e)))?;

        Ok(issuances.into_iter().flat_map(|i| i.dns_names).collect())
    }
}

#[async_trait]
impl DiscoveryTechnique for CertTransparency {
    async fn discover(
        &self,
        domain: &SeedDomain,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, DiscoveryError> {
        if cancel.is_cancelled() {
            return Ok(Vec::new());
        }

        let (crtsh, certspotter) = tokio::join!(
            self.query_crtsh(domain.as_str()),
            self.query_certspotter(domain.as_str())
        );

        let mut hostnames = Vec::new();
        let mut failures = 0;
        for (source, result) in [("crt.sh", crtsh), ("certspotter", certspotter)] {
            match result {
                Ok(names) => {
                    debug!(source, count = names.len(), "证书透明度数据源返回");
                    hostnames.extend(names);
                }
                Err(e) => {
                    warn!(source, error = %e, "证书透明度数据源失败");
                    failures += 1;
                }
            }
        }

        if failures == 2 {
            return Err(DiscoveryError::AllSourcesFailed);
        }
        Ok(hostnames)
    }

    fn kind(&self) -> TechniqueKind {
        TechniqueKind::CertificateTransparency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn seed() -> SeedDomain {
        SeedDomain::parse("example.gov").unwrap()
    }

    #[tokio::test]
    async fn test_both_sources_are_combined() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("q", "%.example.gov"))
            .and(query_param("output", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name_value": "api.example.gov\n*.example.gov"},
                {"name_value": "mail.example.gov"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/issuances"))
            .and(query_param("domain", "example.gov"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"dns_names": ["vpn.example.gov", "api.example.gov"]}
            ])))
            .mount(&server)
            .await;

        let technique =
            CertTransparency::with_endpoints(reqwest::Client::new(), &server.uri(), &server.uri());
        let names = technique
            .discover(&seed(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            names,
            vec![
                "api.example.gov",
                "*.example.gov",
                "mail.example.gov",
                "vpn.example.gov",
                "api.example.gov"
            ]
        );
    }

    #[tokio::test]
    async fn test_one_failed_source_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/issuances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"dns_names": ["vpn.example.gov"]}
            ])))
            .mount(&server)
            .await;

        let technique =
            CertTransparency::with_endpoints(reqwest::Client::new(), &server.uri(), &server.uri());
        let names = technique
            .discover(&seed(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(names, vec!["vpn.example.gov"]);
    }

    #[tokio::test]
    async fn test_all_sources_failing_fails_the_technique() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/issuances"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let technique =
            CertTransparency::with_endpoints(reqwest::Client::new(), &server.uri(), &server.uri());
        let result = technique.discover(&seed(), &CancellationToken::new()).await;
        assert!(matches!(result, Err(DiscoveryError::AllSourcesFailed)));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_returns_empty() {
        let technique = CertTransparency::with_endpoints(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            "http://127.0.0.1:9",
        );
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(technique.discover(&seed(), &cancel).await.unwrap().is_empty());
    }
}
