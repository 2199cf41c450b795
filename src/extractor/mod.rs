//! Content extraction and page classification
//!
//! Turns raw HTML plus a crawl strategy into a [`CrawlResult`]: cleaned main
//! content, a content-type label, a relevance score, and prioritized outbound
//! links. Relevance is two-tier: a cheap keyword-overlap score everywhere,
//! and one semantic scoring call only when the keyword score lands inside the
//! ambiguous zone around the strategy's relevance floor.

pub mod content;
pub mod links;

pub use content::{extract_main_content, extract_title};
pub use links::extract_links;

use crate::config::ExtractorConfig;
use crate::llm::{parse_score, CompletionModel};
use crate::models::{ContentType, CrawlResult, CrawlStrategy, OutboundLink};
use crate::utils::error::ExtractError;
use crate::utils::truncate_text;
use chrono::Utc;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::{Arc, OnceLock};
use url::Url;

/// Content snippet cap for semantic scoring prompts
const SCORE_SNIPPET_CHARS: usize = 1500;

fn heading_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("h1, h2, h3, dt, summary").expect("Invalid heading selector"))
}

fn currency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[$€£]\s?\d").expect("Invalid currency regex"))
}

/// Extracts and classifies content from fetched pages
pub struct ContentExtractor {
    llm: Arc<dyn CompletionModel>,
    ambiguity_margin: f64,
}

/// Page fields produced by the synchronous HTML pass
struct ParsedPage {
    title: String,
    content: String,
    content_type: ContentType,
    outbound_links: Vec<OutboundLink>,
}

impl ContentExtractor {
    /// Create an extractor backed by the given completion model
    pub fn new(llm: Arc<dyn CompletionModel>, config: &ExtractorConfig) -> Self {
        Self {
            llm,
            ambiguity_margin: config.ambiguity_margin,
        }
    }

    /// Extract a [`CrawlResult`] from raw HTML.
    ///
    /// Fails only on empty or contentless HTML. Makes at most one completion
    /// call (semantic scoring in the ambiguous zone); that call failing or
    /// timing out falls back to the keyword score. Identical inputs yield
    /// identical results apart from the fetch timestamp.
    pub async fn extract(
        &self,
        html: &str,
        url: &str,
        depth: usize,
        strategy: &CrawlStrategy,
    ) -> Result<CrawlResult, ExtractError> {
        if html.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        // The HTML pass is synchronous and self-contained: the parsed DOM is
        // not Send and must not be held across an await point.
        let page = parse_page(html, url, strategy)?;

        let relevance_score = self.score_relevance(&page.content, strategy).await;

        Ok(CrawlResult {
            url: url.to_string(),
            depth,
            title: page.title,
            content: page.content,
            content_type: page.content_type,
            relevance_score,
            outbound_links: page.outbound_links,
            fetched_at: Utc::now(),
        })
    }

    /// Two-tier relevance scoring
    async fn score_relevance(&self, content: &str, strategy: &CrawlStrategy) -> f64 {
        let tier_a = keyword_score(content, &strategy.keywords);

        let ambiguous = (tier_a - strategy.min_relevance).abs() <= self.ambiguity_margin;
        if !ambiguous || strategy.task.is_empty() {
            return tier_a;
        }

        match self.semantic_score(content, &strategy.task).await {
            Ok(tier_b) => tier_a.max(tier_b),
            Err(e) => {
                tracing::warn!(error = %e, "Semantic scoring failed, using keyword score");
                tier_a
            }
        }
    }

    async fn semantic_score(
        &self,
        content: &str,
        task: &str,
    ) -> Result<f64, crate::utils::error::LlmError> {
        let snippet = truncate_text(content, SCORE_SNIPPET_CHARS);
        let prompt = format!(
            "Rate the relevance of this content on a scale of 0.0 to 1.0 for the task:\n\
             \"{task}\"\n\n\
             Content:\n\"{snippet}\"\n\n\
             Return only a number between 0 and 1."
        );

        let response = self.llm.complete(&prompt).await?;
        parse_score(&response)
    }
}

fn parse_page(html: &str, url: &str, strategy: &CrawlStrategy) -> Result<ParsedPage, ExtractError> {
    let document = Html::parse_document(html);

    let title = extract_title(&document, url);
    let content = extract_main_content(&document)?;
    let content_type = detect_content_type(&document, url, &content);

    let outbound_links = match Url::parse(url) {
        Ok(base) => extract_links(&document, &base, strategy),
        Err(_) => Vec::new(),
    };

    Ok(ParsedPage {
        title,
        content,
        content_type,
        outbound_links,
    })
}

/// Detect the content type from URL path and structural/text signals
pub fn detect_content_type(document: &Html, url: &str, content: &str) -> ContentType {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(hint) = links::path_type_hint(&parsed) {
            return hint;
        }
    }

    let text_lower = content.to_lowercase();

    // Repeated question-style headings are the strongest FAQ signal
    let question_headings = document
        .select(heading_selector())
        .filter(|el| {
            el.text()
                .collect::<String>()
                .trim()
                .ends_with('?')
        })
        .count();

    if question_headings >= 3 || text_lower.contains("frequently asked") {
        return ContentType::Faq;
    }

    if currency_re().is_match(content) {
        if text_lower.contains("month") || text_lower.contains("year") {
            return ContentType::Pricing;
        }
        return ContentType::Product;
    }

    ContentType::Generic
}

/// Tier-1 relevance: matched keyword weight over total keyword weight.
///
/// An empty keyword set carries no signal and cannot reject a page, so it
/// scores 1.0.
pub fn keyword_score(content: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 1.0;
    }

    let content_lower = content.to_lowercase();
    let matched = keywords
        .iter()
        .filter(|kw| content_lower.contains(&kw.to_lowercase()))
        .count();

    matched as f64 / keywords.len() as f64
}
