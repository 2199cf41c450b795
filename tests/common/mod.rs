//! Shared fixtures for integration tests: a scriptable completion model and
//! small HTML pages served through wiremock.
#![allow(dead_code)]

use async_trait::async_trait;
use rufus::error::LlmError;
use rufus::llm::CompletionModel;
use std::sync::Mutex;

/// Completion model stub that routes by prompt kind.
///
/// Strategy, scoring, and synthesis prompts are distinguishable by their
/// fixed phrasing; a `None` response makes that kind of call fail.
pub struct StubModel {
    pub strategy_json: Option<String>,
    pub score: Option<f64>,
    pub synthesis: Option<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn new() -> Self {
        Self {
            strategy_json: None,
            synthesis: Some("synthesized document".to_string()),
            score: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_strategy(strategy_json: &str) -> Self {
        Self {
            strategy_json: Some(strategy_json.to_string()),
            ..Self::new()
        }
    }

    pub fn strategy_calls(&self) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains("single JSON object"))
            .count()
    }
}

#[async_trait]
impl CompletionModel for StubModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if prompt.contains("single JSON object") {
            return match &self.strategy_json {
                Some(json) => Ok(json.clone()),
                None => Err(LlmError::Unreachable("stubbed outage".to_string())),
            };
        }

        if prompt.contains("Rate the relevance") {
            return match self.score {
                Some(score) => Ok(score.to_string()),
                None => Err(LlmError::Timeout),
            };
        }

        match &self.synthesis {
            Some(text) => Ok(text.clone()),
            None => Err(LlmError::Timeout),
        }
    }
}

/// Hub page with no target keywords, linking to the interesting leaves
pub const HUB_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Acme Home</title></head>
<body>
  <nav><a href="/alpha">Docs</a></nav>
  <main>
    <p>Welcome to our corporate site.</p>
    <a href="/alpha">Read the first guide</a>
    <a href="/beta">Read the second guide</a>
  </main>
</body></html>"#;

/// Leaf page mentioning both target keywords
pub const ALPHA_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Alpha Guide</title></head>
<body><main>
  <p>Everything about alpha and beta workflows, explained in depth with
  enough words to count as real page content for extraction.</p>
</main></body></html>"#;

/// Leaf page mentioning neither keyword
pub const BETA_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Unrelated</title></head>
<body><main>
  <p>Quarterly shareholder letter about unrelated corporate matters and
  nothing that the crawl instruction asked for.</p>
</main></body></html>"#;
