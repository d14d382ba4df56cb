// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{clean_article_html, fast_governor, StaticPageFetcher, StubResolver};
use reconrs::application::context::RunContext;
use reconrs::application::use_cases::recon_run::ReconPipeline;
use reconrs::domain::discovery::technique::DiscoveryTechnique;
use reconrs::domain::models::candidate_target::{SeedDomain, TechniqueKind};
use reconrs::domain::models::run_event::RunEvent;
use reconrs::domain::repositories::content_record_repository::{
    ContentRecordRepository, RecordCriteria,
};
use reconrs::infrastructure::discovery::aggregator::DiscoveryEngine;
use reconrs::infrastructure::discovery::build_client;
use reconrs::infrastructure::discovery::cert_transparency::CertTransparency;
use reconrs::infrastructure::discovery::dns_bruteforce::DnsBruteForce;
use reconrs::infrastructure::repositories::jsonl_record_repo::JsonLinesRecordRepository;
use reconrs::infrastructure::services::event_publishers::ChannelPublisher;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn ct_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "%.example.gov"))
        .and(query_param("output", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name_value": "api.example.gov" },
            { "name_value": "API.example.gov.\n*.api.example.gov" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/issuances"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;
    server
}

fn discovery_engine(ct: &MockServer) -> DiscoveryEngine {
    let techniques: Vec<Arc<dyn DiscoveryTechnique>> = vec![
        Arc::new(CertTransparency::with_endpoints(
            build_client(Duration::from_secs(5)),
            &ct.uri(),
            &ct.uri(),
        )),
        Arc::new(DnsBruteForce::new(
            StubResolver::new(&["www.example.gov", "portal.example.gov"]),
            ["www", "portal", "mail", "vpn", "dev"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            4,
            Duration::from_secs(1),
        )),
    ];
    DiscoveryEngine::new(techniques, Duration::from_secs(10))
}

fn seed() -> SeedDomain {
    SeedDomain::parse("example.gov").unwrap()
}

#[tokio::test]
async fn test_discovery_returns_union_tagged_by_technique() {
    let ct = ct_server().await;
    let engine = discovery_engine(&ct);

    let summary = engine.discover(&seed(), &CancellationToken::new()).await;

    let hostnames: Vec<&str> = summary.targets.iter().map(|t| t.hostname.as_str()).collect();
    assert_eq!(
        hostnames,
        vec!["api.example.gov", "portal.example.gov", "www.example.gov"]
    );
    for target in &summary.targets {
        assert!(target.hostname.ends_with("example.gov"));
    }

    let tags = |host: &str| -> BTreeSet<TechniqueKind> {
        summary
            .targets
            .iter()
            .find(|t| t.hostname == host)
            .map(|t| t.techniques.clone())
            .unwrap_or_default()
    };
    assert_eq!(
        tags("api.example.gov"),
        BTreeSet::from([TechniqueKind::CertificateTransparency])
    );
    assert_eq!(tags("www.example.gov"), BTreeSet::from([TechniqueKind::DnsBruteForce]));
    assert_eq!(
        tags("portal.example.gov"),
        BTreeSet::from([TechniqueKind::DnsBruteForce])
    );
    assert!(summary.failures.is_empty());
}

#[tokio::test]
async fn test_full_run_accepts_one_clean_page() {
    let ct = ct_server().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("records.jsonl");

    let html = clean_article_html(1000);
    let fetcher = StaticPageFetcher::new(html);
    let repository = Arc::new(JsonLinesRecordRepository::new(&output));
    let pipeline = ReconPipeline::new(
        discovery_engine(&ct),
        vec![fast_governor(fetcher.clone())],
        repository.clone(),
    );

    let (publisher, mut events) = ChannelPublisher::channel();
    let ctx = RunContext::new(Arc::new(publisher));
    let report = pipeline.run(&[seed()], &ctx).await.unwrap();

    assert_eq!(report.targets.len(), 3);
    assert_eq!(fetcher.calls(), 3);
    // 三个主机返回同一页面，只有第一条被接受
    assert_eq!(report.stats.accepted, 1);
    assert_eq!(report.stored_ids.len(), 1);

    let records = JsonLinesRecordRepository::new(&output)
        .find(&RecordCriteria::default())
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert!(record.text.split_whitespace().count() >= 1000);
    assert!(
        record.quality_score.unwrap() > 70.0,
        "score was {:?}",
        record.quality_score
    );
    assert_eq!(record.accepted, Some(true));
    assert_eq!(record.title, "Harbor Authority Maintenance Bulletin");

    let mut verdicts = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let RunEvent::RecordEvaluated { verdict, .. } = event {
            verdicts.push(verdict);
        }
    }
    assert_eq!(
        verdicts,
        vec!["accepted", "exact_duplicate", "exact_duplicate"]
    );
}
