//! Link extraction and priority scoring
//!
//! Harvests anchors from a page, resolves them to normalized absolute URLs,
//! and predicts a crawl priority per link so the frontier can order its work.

use crate::models::{ContentType, CrawlStrategy, OutboundLink};
use crate::utils::{normalize_url, normalize_whitespace, registered_domain};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::OnceLock;
use url::Url;

/// Priority weight for staying on the seed's registered domain
const DOMAIN_WEIGHT: f64 = 0.3;

/// Priority weight for keyword overlap in anchor text and URL
const KEYWORD_WEIGHT: f64 = 0.5;

/// Priority weight for a content-type hint in the URL path
const TYPE_HINT_WEIGHT: f64 = 0.2;

fn anchor_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("a[href]").expect("Invalid anchor selector"))
}

/// Extract outbound links, scored and sorted by descending priority
pub fn extract_links(document: &Html, base: &Url, strategy: &CrawlStrategy) -> Vec<OutboundLink> {
    let base_domain = base.host_str().map(registered_domain);
    let self_url = normalize_url(base.as_str());

    let mut by_url: HashMap<String, OutboundLink> = HashMap::new();

    for anchor in document.select(anchor_selector()) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        if href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with('#')
        {
            continue;
        }

        let Ok(resolved) = base.join(href) else {
            continue;
        };

        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }

        let Some(url) = normalize_url(resolved.as_str()) else {
            continue;
        };

        if self_url.as_deref() == Some(url.as_str()) {
            continue;
        }

        let anchor_text = normalize_whitespace(&anchor.text().collect::<String>());
        let priority = link_priority(&resolved, &anchor_text, base_domain.as_deref(), strategy);

        // Keep the highest-priority occurrence of a repeated link
        by_url
            .entry(url.clone())
            .and_modify(|existing| {
                if priority > existing.priority {
                    existing.priority = priority;
                    existing.anchor_text = anchor_text.clone();
                }
            })
            .or_insert(OutboundLink {
                url,
                anchor_text,
                priority,
            });
    }

    let mut links: Vec<OutboundLink> = by_url.into_values().collect();
    links.sort_by(|a, b| {
        b.priority
            .total_cmp(&a.priority)
            .then_with(|| a.url.cmp(&b.url))
    });
    links
}

/// Predicted priority: weighted sum of domain match, anchor keyword overlap,
/// and a content-type hint from the URL path
fn link_priority(
    url: &Url,
    anchor_text: &str,
    base_domain: Option<&str>,
    strategy: &CrawlStrategy,
) -> f64 {
    let mut priority = 0.0;

    if let (Some(base), Some(host)) = (base_domain, url.host_str()) {
        if registered_domain(host) == base {
            priority += DOMAIN_WEIGHT;
        }
    }

    if !strategy.keywords.is_empty() {
        let haystack = format!("{} {}", anchor_text.to_lowercase(), url.path().to_lowercase());
        let matched = strategy
            .keywords
            .iter()
            .filter(|kw| haystack.contains(&kw.to_lowercase()))
            .count();
        priority += KEYWORD_WEIGHT * (matched as f64 / strategy.keywords.len() as f64);
    }

    if path_type_hint(url)
        .map(|ct| strategy.accepts(ct))
        .unwrap_or(false)
    {
        priority += TYPE_HINT_WEIGHT;
    }

    priority
}

/// Content-type hint from URL path segments
pub fn path_type_hint(url: &Url) -> Option<ContentType> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .find_map(ContentType::parse)
}
