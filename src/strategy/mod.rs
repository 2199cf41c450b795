//! Instruction-to-strategy derivation
//!
//! One classification call turns the user's free-text instruction into a
//! [`CrawlStrategy`]. The model's output is advisory: numeric limits are
//! clamped to configured ceilings and can only tighten, never widen, the
//! caller's own limits.

use crate::config::CrawlerConfig;
use crate::llm::{extract_json, CompletionModel};
use crate::models::{ContentType, CrawlStrategy, TerminationRule};
use crate::utils::error::StrategyError;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Default consecutive-irrelevant stop limit when the model gives none
const DEFAULT_IRRELEVANT_LIMIT: usize = 8;

/// Structured fields the classification model is asked to emit.
///
/// Every field is optional; anything missing or unusable falls back to the
/// configured defaults rather than failing the build.
#[derive(Debug, Deserialize)]
struct StrategyResponse {
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    content_types: Vec<String>,
    min_relevance: Option<f64>,
    max_pages: Option<usize>,
    max_depth: Option<usize>,
    #[serde(default)]
    needs_rendering: bool,
    follow_hub_links: Option<bool>,
    consecutive_irrelevant_limit: Option<usize>,
}

/// Builds a [`CrawlStrategy`] from a free-text instruction
pub struct StrategyBuilder {
    llm: Arc<dyn CompletionModel>,
    config: CrawlerConfig,
}

impl StrategyBuilder {
    /// Create a builder backed by the given completion model
    pub fn new(llm: Arc<dyn CompletionModel>, config: CrawlerConfig) -> Self {
        Self { llm, config }
    }

    /// Derive a strategy for crawling `seed_url` under `instruction`.
    ///
    /// Makes one classification call, retried once on an unreachable model or
    /// unusable response. An empty instruction skips the model entirely and
    /// yields the permissive configured defaults.
    ///
    /// # Errors
    ///
    /// `StrategyError` when both the call and its single retry fail.
    pub async fn build(
        &self,
        instruction: &str,
        seed_url: &str,
    ) -> Result<CrawlStrategy, StrategyError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            tracing::debug!("Empty instruction, using default strategy");
            return Ok(self.default_strategy(instruction));
        }

        let prompt = Self::build_prompt(instruction, seed_url);

        let mut last_err = None;
        for attempt in 0..2 {
            if attempt > 0 {
                tracing::warn!("Strategy derivation failed, retrying once");
            }

            match self.llm.complete(&prompt).await {
                Ok(response) => match Self::parse_response(&response) {
                    Ok(parsed) => {
                        let strategy = self.apply_response(instruction, parsed);
                        tracing::info!(
                            keywords = strategy.keywords.len(),
                            target_types = strategy.target_types.len(),
                            min_relevance = strategy.min_relevance,
                            max_pages = strategy.max_pages,
                            max_depth = strategy.max_depth,
                            "Strategy built"
                        );
                        return Ok(strategy);
                    }
                    Err(e) => last_err = Some(e),
                },
                Err(e) => last_err = Some(StrategyError::LlmFailed(e)),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            StrategyError::InvalidResponse("no response from model".to_string())
        }))
    }

    fn build_prompt(instruction: &str, seed_url: &str) -> String {
        let known_types = ContentType::all()
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "You are planning a focused web crawl of {seed_url}.\n\
             The user wants: \"{instruction}\"\n\n\
             Respond with a single JSON object with these fields:\n\
             {{\n\
               \"keywords\": [\"5-10 lowercase terms relevant pages would contain\"],\n\
               \"content_types\": [\"page types to keep, from: {known_types}\"],\n\
               \"min_relevance\": 0.0 to 1.0 relevance floor,\n\
               \"max_pages\": suggested page budget,\n\
               \"max_depth\": suggested link depth,\n\
               \"needs_rendering\": true if the site likely requires JavaScript,\n\
               \"follow_hub_links\": true if navigation pages should be followed,\n\
               \"consecutive_irrelevant_limit\": stop after this many irrelevant pages in a row\n\
             }}\n\n\
             Return only the JSON object."
        )
    }

    fn parse_response(response: &str) -> Result<StrategyResponse, StrategyError> {
        let json = extract_json(response);
        serde_json::from_str(&json).map_err(|e| {
            StrategyError::InvalidResponse(format!("unusable strategy JSON: {e}"))
        })
    }

    /// Merge model suggestions with configured limits; the caller's limits win
    fn apply_response(&self, instruction: &str, response: StrategyResponse) -> CrawlStrategy {
        // dedupe while keeping the model's order
        let mut seen = HashSet::new();
        let keywords: Vec<String> = response
            .keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty() && seen.insert(k.clone()))
            .collect();

        let mut target_types: Vec<ContentType> = response
            .content_types
            .iter()
            .filter_map(|label| ContentType::parse(label))
            .collect();
        target_types.sort();
        target_types.dedup();

        // accept-all is expressed by an empty target list
        if target_types.contains(&ContentType::Generic) {
            target_types.clear();
        }

        let min_relevance = response
            .min_relevance
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(self.config.min_relevance);

        let max_pages = self.config.clamp_max_pages(
            response
                .max_pages
                .map(|v| v.min(self.config.max_pages))
                .unwrap_or(self.config.max_pages),
        );

        let max_depth = self.config.clamp_max_depth(
            response
                .max_depth
                .map(|v| v.min(self.config.max_depth))
                .unwrap_or(self.config.max_depth),
        );

        let limit = response
            .consecutive_irrelevant_limit
            .unwrap_or(DEFAULT_IRRELEVANT_LIMIT)
            .max(1);

        CrawlStrategy {
            keywords,
            target_types,
            min_relevance,
            max_pages,
            max_depth,
            needs_rendering: response.needs_rendering,
            follow_hub_links: response
                .follow_hub_links
                .unwrap_or(self.config.follow_hub_links),
            termination: vec![TerminationRule::ConsecutiveIrrelevant { limit }],
            task: instruction.to_string(),
        }
    }

    /// Permissive strategy used when no instruction was given
    fn default_strategy(&self, instruction: &str) -> CrawlStrategy {
        CrawlStrategy {
            keywords: Vec::new(),
            target_types: Vec::new(),
            min_relevance: self.config.min_relevance,
            max_pages: self.config.clamp_max_pages(self.config.max_pages),
            max_depth: self.config.clamp_max_depth(self.config.max_depth),
            needs_rendering: false,
            follow_hub_links: self.config.follow_hub_links,
            termination: Vec::new(),
            task: instruction.to_string(),
        }
    }
}
