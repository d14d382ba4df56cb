// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{clean_article_html, fast_config};
use reconrs::domain::models::fetch::{FetchOutcome, SessionState};
use reconrs::domain::services::extraction_service::ExtractionService;
use reconrs::domain::services::quality_service::{QualityFilter, Verdict};
use reconrs::engines::governor::RequestGovernor;
use reconrs::engines::identity::IdentityPool;
use reconrs::engines::reqwest_engine::ReqwestEngine;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_extract_and_accept_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bulletin"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(clean_article_html(600)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let governor = RequestGovernor::new(
        Arc::new(ReqwestEngine::new()),
        IdentityPool::default(),
        fast_config(),
    );
    let url = format!("{}/bulletin", server.uri());
    let attempt = governor.fetch(&url).await;
    assert_eq!(attempt.outcome, FetchOutcome::Success);
    assert_eq!(attempt.status_code, Some(200));

    let mut record = ExtractionService::default().parse(&attempt.body, &url);
    assert_eq!(record.links, vec![format!("{}/bulletins/archive", server.uri())]);

    let evaluation = QualityFilter::default().evaluate(&mut record);
    assert_eq!(evaluation.verdict, Verdict::Accepted);
    assert!(evaluation.score > 70.0);
}

#[tokio::test]
async fn test_block_page_puts_session_into_cooldown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let governor = RequestGovernor::new(
        Arc::new(ReqwestEngine::new()),
        IdentityPool::default(),
        fast_config(),
    );
    let attempt = governor.fetch(&format!("{}/search", server.uri())).await;

    assert_eq!(attempt.outcome, FetchOutcome::Blocked);
    assert!(attempt.body.is_empty());
    assert_eq!(governor.session_state().await, SessionState::CoolingDown);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let governor = RequestGovernor::new(
        Arc::new(ReqwestEngine::new()),
        IdentityPool::default(),
        fast_config(),
    );
    let attempt = governor.fetch(&format!("{}/broken", server.uri())).await;

    assert_eq!(attempt.outcome, FetchOutcome::Error);
    assert_eq!(attempt.status_code, Some(500));
}
