//! Extraction, typing, and relevance properties

mod common;

use common::StubModel;
use rufus::config::ExtractorConfig;
use rufus::extractor::ContentExtractor;
use rufus::models::{ContentType, CrawlStrategy};
use std::sync::Arc;

fn extractor() -> ContentExtractor {
    ContentExtractor::new(Arc::new(StubModel::new()), &ExtractorConfig::default())
}

fn strategy(keywords: &[&str], min_relevance: f64) -> CrawlStrategy {
    CrawlStrategy {
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        min_relevance,
        ..Default::default()
    }
}

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Billing FAQ</title></head>
<body>
  <nav>Home | Products | Careers</nav>
  <header>Acme navigation banner</header>
  <main>
    <h2>How do I update my card?</h2>
    <p>Open billing settings and replace the stored card.</p>
    <h2>When am I charged?</h2>
    <p>On the first day of every month.</p>
    <h2>Can I get a refund?</h2>
    <p>Within 30 days of payment.</p>
    <a href="/pricing">Plans</a>
    <a href="/blog/changelog">Changelog</a>
  </main>
  <footer>Copyright Acme. All rights reserved.</footer>
</body>
</html>"#;

#[tokio::test]
async fn test_boilerplate_is_stripped() {
    let result = extractor()
        .extract(PAGE, "https://acme.test/help", 0, &strategy(&[], 0.3))
        .await
        .unwrap();

    assert!(result.content.contains("billing settings"));
    assert!(!result.content.contains("navigation banner"));
    assert!(!result.content.contains("All rights reserved"));
    assert!(!result.content.contains("Careers"));
}

#[tokio::test]
async fn test_question_headings_classify_as_faq() {
    let result = extractor()
        .extract(PAGE, "https://acme.test/page", 0, &strategy(&[], 0.3))
        .await
        .unwrap();
    assert_eq!(result.content_type, ContentType::Faq);
    assert_eq!(result.title, "Billing FAQ");
}

#[tokio::test]
async fn test_url_path_hint_wins_over_body_signals() {
    let result = extractor()
        .extract(PAGE, "https://acme.test/pricing/plans", 0, &strategy(&[], 0.3))
        .await
        .unwrap();
    assert_eq!(result.content_type, ContentType::Pricing);
}

#[tokio::test]
async fn test_links_are_sorted_and_absolute() {
    let strat = CrawlStrategy {
        keywords: vec!["pricing".to_string()],
        target_types: vec![ContentType::Pricing],
        ..Default::default()
    };
    let result = extractor()
        .extract(PAGE, "https://acme.test/help", 0, &strat)
        .await
        .unwrap();

    assert_eq!(result.outbound_links.len(), 2);
    assert_eq!(result.outbound_links[0].url, "https://acme.test/pricing");
    assert!(result.outbound_links[0].priority > result.outbound_links[1].priority);
    for pair in result.outbound_links.windows(2) {
        assert!(pair[0].priority >= pair[1].priority);
    }
}

#[tokio::test]
async fn test_keyword_score_is_matched_fraction() {
    let result = extractor()
        .extract(
            PAGE,
            "https://acme.test/help",
            0,
            &strategy(&["refund", "nonexistent-term"], 0.9),
        )
        .await
        .unwrap();
    assert_eq!(result.relevance_score, 0.5);
}

#[tokio::test]
async fn test_title_falls_back_to_url() {
    let html = "<html><body><main><p>Body without a title tag.</p></main></body></html>";
    let result = extractor()
        .extract(html, "https://acme.test/untitled", 0, &strategy(&[], 0.3))
        .await
        .unwrap();
    assert_eq!(result.title, "https://acme.test/untitled");
}

#[tokio::test]
async fn test_extract_twice_yields_identical_result() {
    let ex = extractor();
    let strat = strategy(&["refund"], 0.3);

    let a = ex.extract(PAGE, "https://acme.test/help", 1, &strat).await.unwrap();
    let b = ex.extract(PAGE, "https://acme.test/help", 1, &strat).await.unwrap();

    assert_eq!(a.content, b.content);
    assert_eq!(a.title, b.title);
    assert_eq!(a.content_type, b.content_type);
    assert_eq!(a.relevance_score, b.relevance_score);
    assert_eq!(
        a.outbound_links.iter().map(|l| &l.url).collect::<Vec<_>>(),
        b.outbound_links.iter().map(|l| &l.url).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_depth_is_carried_through() {
    let result = extractor()
        .extract(PAGE, "https://acme.test/help", 4, &strategy(&[], 0.3))
        .await
        .unwrap();
    assert_eq!(result.depth, 4);
}
