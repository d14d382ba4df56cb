// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::domain::models::content_record::MediaReference;
use crate::domain::services::extraction_service::ExtractionService;

fn article(sentences: usize) -> String {
    (0..sentences)
        .map(|i| {
            format!(
                "Sentence number {} describes the harbor logistics schedule for the coming week in plain terms.",
                i
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn record_with_text(url: &str, text: &str) -> ContentRecord {
    ContentRecord {
        url: url.to_string(),
        domain: "portal.example.gov".to_string(),
        title: "Harbor schedule".to_string(),
        meta_description: "Weekly harbor logistics".to_string(),
        text: text.to_string(),
        headings: vec!["Schedule".to_string()],
        links: vec!["https://portal.example.gov/archive".to_string()],
        media: Vec::new(),
        fingerprint: fingerprint(text),
        quality_score: None,
        accepted: None,
    }
}

fn image(url: &str, alt: &str) -> MediaReference {
    MediaReference {
        kind: MediaKind::Image,
        url: url.to_string(),
        alt_text: alt.to_string(),
        title: String::new(),
    }
}

#[test]
fn test_fingerprint_known_value() {
    assert_eq!(
        fingerprint("hello world"),
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
    assert_eq!(fingerprint("  Hello \n  WORLD "), fingerprint("hello world"));
}

#[test]
fn test_similarity_bounds() {
    assert_eq!(similarity("", "anything here"), 0.0);
    assert_eq!(similarity("a b c", ""), 0.0);
    assert_eq!(similarity("Alpha beta", "alpha BETA"), 1.0);
    assert!((similarity("a b c d", "a b c e") - 0.6).abs() < 1e-9);
}

#[test]
fn test_short_text_scores_below_threshold() {
    let mut record = ExtractionService::default().parse("<p>hi there</p>", "https://example.gov/");
    let mut filter = QualityFilter::default();

    let evaluation = filter.evaluate(&mut record);

    assert!(evaluation.score < 30.0, "score was {}", evaluation.score);
    assert!(!evaluation.accepted);
    assert_eq!(evaluation.verdict, Verdict::LowQuality);
    assert_eq!(record.accepted, Some(false));
    assert_eq!(record.quality_score, Some(evaluation.score));
}

#[test]
fn test_clean_article_scores_above_seventy() {
    let text = article(40);
    assert!(text.split_whitespace().count() >= 500);

    let mut record = record_with_text("https://portal.example.gov/news/1", &text);
    let mut filter = QualityFilter::default();
    let evaluation = filter.evaluate(&mut record);

    assert!(evaluation.score > 70.0, "score was {}", evaluation.score);
    assert!(evaluation.accepted);
    assert_eq!(evaluation.verdict, Verdict::Accepted);
    assert_eq!(filter.accepted_count(), 1);
}

#[test]
fn test_exact_duplicate_is_rejected() {
    let text = article(20);
    let mut filter = QualityFilter::default();

    let mut first = record_with_text("https://portal.example.gov/a", &text);
    let mut second = record_with_text("https://portal.example.gov/b", &text);

    assert!(filter.evaluate(&mut first).accepted);
    let evaluation = filter.evaluate(&mut second);

    assert!(!evaluation.accepted);
    assert_eq!(evaluation.verdict, Verdict::ExactDuplicate);
    assert_eq!(filter.accepted_count(), 1);
}

#[test]
fn test_tracking_parameter_variant_is_near_duplicate() {
    let text = article(20);
    let tracked = format!("{} https://portal.example.gov/news?utm_source=newsletter", text);
    assert_ne!(fingerprint(&text), fingerprint(&tracked));

    let mut filter = QualityFilter::default();
    let mut first = record_with_text("https://portal.example.gov/news", &text);
    let mut second = record_with_text("https://portal.example.gov/news?utm_source=newsletter", &tracked);

    assert!(filter.evaluate(&mut first).accepted);
    let evaluation = filter.evaluate(&mut second);

    assert!(!evaluation.accepted);
    assert_eq!(evaluation.verdict, Verdict::NearDuplicate);
    assert_eq!(second.accepted, Some(false));
}

#[test]
fn test_spam_phrases_are_rejected() {
    let text = format!(
        "{} Click here to buy now before this limited time deal ends.",
        article(10)
    );
    let mut record = record_with_text("https://portal.example.gov/deal", &text);
    let mut filter = QualityFilter::default();

    let report = filter.assess(&record);
    assert!(report.spam);
    assert!(report.issues.iter().any(|i| i == "Possible spam content"));

    let evaluation = filter.evaluate(&mut record);
    assert_eq!(evaluation.verdict, Verdict::Spam);
    assert_eq!(filter.accepted_count(), 0);
}

#[test]
fn test_shouting_text_is_spam() {
    let text = "THE HARBOR IS CLOSED FOR THE WEEKEND AND ALL SHIPS MUST WAIT OUTSIDE THE BREAKWATER UNTIL MONDAY";
    let record = record_with_text("https://portal.example.gov/alert", text);
    let report = QualityFilter::default().assess(&record);

    assert!(report.spam);
    assert!(report.issues.iter().any(|i| i == "Excessive capitalization"));
}

#[test]
fn test_rejected_records_do_not_enter_dedup_memory() {
    let text = article(20);
    let mut filter = QualityFilter::new(QualityConfig {
        acceptance_threshold: 101.0,
        ..QualityConfig::default()
    });
    let mut record = record_with_text("https://portal.example.gov/a", &text);
    assert_eq!(filter.evaluate(&mut record).verdict, Verdict::LowQuality);
    assert_eq!(filter.accepted_count(), 0);

    let mut relaxed = QualityFilter::default();
    let mut again = record_with_text("https://portal.example.gov/a", &text);
    assert!(relaxed.evaluate(&mut again).accepted);
}

#[test]
fn test_repeated_sentences_are_penalised() {
    let text = "The harbor opens at dawn. ".repeat(12);
    let record = record_with_text("https://portal.example.gov/r", &text);
    let report = QualityFilter::default().assess(&record);

    assert!(report.issues.iter().any(|i| i == "High content repetition"));
    assert_eq!(report.text_score, 80.0);
}

#[test]
fn test_media_scoring() {
    let mut record = record_with_text("https://portal.example.gov/m", &article(5));
    let filter = QualityFilter::default();
    assert_eq!(filter.assess(&record).media_score, 50.0);

    record.media = vec![
        image("https://portal.example.gov/a.png", ""),
        image("https://portal.example.gov/b.png", ""),
    ];
    assert_eq!(filter.assess(&record).media_score, 85.0);

    record.media = vec![
        image("https://portal.example.gov/a.png", "harbor"),
        image("not-a-url", "crane"),
    ];
    assert_eq!(filter.assess(&record).media_score, 75.0);
}

#[test]
fn test_structure_scoring() {
    let mut record = record_with_text("https://portal.example.gov/s", &article(5));
    let filter = QualityFilter::default();
    assert_eq!(filter.assess(&record).structure_score, 100.0);

    record.title.clear();
    record.headings.clear();
    record.url = "portal.example.gov/s".to_string();
    assert_eq!(filter.assess(&record).structure_score, 30.0);
}

#[test]
fn test_empty_text_scores_zero() {
    let record = record_with_text("https://portal.example.gov/e", "");
    let report = QualityFilter::default().assess(&record);
    assert_eq!(report.text_score, 0.0);
    assert!(!report.spam);
}

#[test]
fn test_spam_phrases_match_whole_words_only() {
    let text = format!(
        "{} The insurgent group was exclusively tracked by patrols guaranteeing safe passage.",
        article(3)
    );
    let record = record_with_text("https://portal.example.gov/patrol", &text);
    let report = QualityFilter::default().assess(&record);

    assert!(!report.spam);
    assert!(!report.issues.iter().any(|i| i == "Possible spam content"));

    let shouted = format!("{} URGENT notice. Click Here today. Buy now.", article(3));
    let record = record_with_text("https://portal.example.gov/notice", &shouted);
    let report = QualityFilter::default().assess(&record);
    assert!(report.issues.iter().any(|i| i == "Possible spam content"));
}
