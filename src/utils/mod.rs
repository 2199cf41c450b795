//! Common utilities and helper functions
//!
//! This module provides shared URL and text helpers used across the crate.

pub mod error;

use anyhow::{Context, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Normalize a URL: strip the fragment and any trailing slash.
///
/// Two links differing only in fragment or trailing slash would otherwise
/// occupy separate frontier slots.
pub fn normalize_url(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    parsed.set_fragment(None);

    // Strip trailing slashes from the path itself, never from the serialized
    // string: a query value may legitimately end in '/'.
    let path = parsed.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        parsed.set_path(&trimmed);
    }

    let mut normalized = parsed.to_string();
    if parsed.path() == "/" && parsed.query().is_none() && normalized.ends_with('/') {
        normalized.pop();
    }

    Some(normalized)
}

/// Extract the host from a URL
pub fn extract_host(url: &str) -> Result<String> {
    let parsed = Url::parse(url).context("Invalid URL")?;

    parsed
        .host_str()
        .map(|s| s.to_string())
        .context("No host in URL")
}

/// Reduce a host to its registered domain (last two labels).
///
/// A suffix heuristic, not a public-suffix list: good enough to keep
/// `docs.example.com` and `www.example.com` in the same crawl.
pub fn registered_domain(host: &str) -> String {
    let labels: Vec<&str> = host.rsplit('.').take(2).collect();
    labels.into_iter().rev().collect::<Vec<_>>().join(".")
}

/// Whether two URLs share a registered domain
pub fn same_registered_domain(a: &str, b: &str) -> bool {
    match (extract_host(a), extract_host(b)) {
        (Ok(ha), Ok(hb)) => registered_domain(&ha) == registered_domain(&hb),
        _ => false,
    }
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

    let re = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    re.replace_all(text.trim(), " ").to_string()
}

/// Truncate text to a maximum length, appending an ellipsis when cut.
///
/// Cuts on a char boundary so multi-byte content never splits mid-character.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }

    let budget = max_len.saturating_sub(3);
    let mut cut = budget;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}
