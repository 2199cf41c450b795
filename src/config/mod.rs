//! Configuration management for the rufus crawler
//!
//! Handles loading and validating configuration from defaults, TOML files,
//! and environment variables. Caller-supplied limits are always clamped to
//! the hard safety ceilings defined here before a crawl starts.

use crate::llm::LlmConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Hard ceiling on pages per crawl, regardless of caller or model input
pub const MAX_PAGES_CEILING: usize = 500;

/// Hard ceiling on crawl depth
pub const MAX_DEPTH_CEILING: usize = 10;

/// Hard ceiling on concurrent fetches
pub const MAX_CONCURRENCY: usize = 64;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Crawler configuration
    pub crawler: CrawlerConfig,

    /// Content extractor configuration
    pub extractor: ExtractorConfig,

    /// Document synthesis configuration
    pub synthesis: SynthesisConfig,

    /// LLM collaborator configuration
    pub llm: LlmConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Default maximum pages per crawl
    pub max_pages: usize,

    /// Default maximum link depth from the seed
    pub max_depth: usize,

    /// Size of the concurrent fetch worker pool
    pub concurrency: usize,

    /// Default relevance floor in [0, 1]
    pub min_relevance: f64,

    /// Minimum spacing between requests to the same domain, in milliseconds
    pub politeness_delay_ms: u64,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Restrict the crawl to the seed's registered domain
    pub same_domain_only: bool,

    /// Follow links out of rejected (hub) pages
    pub follow_hub_links: bool,

    /// Frontier capacity multiplier: queue is capped at
    /// `max_pages * branching_estimate`
    pub branching_estimate: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 30,
            max_depth: 3,
            concurrency: 5,
            min_relevance: 0.3,
            politeness_delay_ms: 500,
            request_timeout_secs: 10,
            same_domain_only: true,
            follow_hub_links: true,
            branching_estimate: 20,
        }
    }
}

/// Content extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Half-width of the ambiguous zone around the relevance floor within
    /// which the semantic (tier-2) score is requested
    pub ambiguity_margin: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ambiguity_margin: 0.2,
        }
    }
}

/// Document synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Cumulative content budget per group, in characters
    pub budget_chars: usize,

    /// Per-page snippet cap inside synthesis prompts, in characters
    pub snippet_chars: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            budget_chars: 6000,
            snippet_chars: 1500,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format ("json" or "text")
    pub format: String,

    /// Base output path; a UUID tag and extension are appended
    pub base_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: String::from("json"),
            base_path: String::from("rufus_documents"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables over defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_parse::<usize>("RUFUS_MAX_PAGES") {
            config.crawler.max_pages = v;
        }
        if let Some(v) = env_parse::<usize>("RUFUS_MAX_DEPTH") {
            config.crawler.max_depth = v;
        }
        if let Some(v) = env_parse::<usize>("RUFUS_CONCURRENCY") {
            config.crawler.concurrency = v;
        }
        if let Some(v) = env_parse::<f64>("RUFUS_MIN_RELEVANCE") {
            config.crawler.min_relevance = v;
        }
        if let Some(v) = env_parse::<u64>("RUFUS_POLITENESS_DELAY_MS") {
            config.crawler.politeness_delay_ms = v;
        }
        if let Some(v) = env_parse::<u64>("RUFUS_REQUEST_TIMEOUT") {
            config.crawler.request_timeout_secs = v;
        }
        if let Some(v) = env_parse::<bool>("RUFUS_SAME_DOMAIN_ONLY") {
            config.crawler.same_domain_only = v;
        }
        if let Some(v) = env_parse::<bool>("RUFUS_FOLLOW_HUB_LINKS") {
            config.crawler.follow_hub_links = v;
        }
        if let Ok(v) = std::env::var("RUFUS_OUTPUT_FORMAT") {
            config.output.format = v;
        }
        if let Ok(v) = std::env::var("RUFUS_LOG_LEVEL") {
            config.logging.level = v;
        }

        config.llm = LlmConfig::from_env();

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.crawler.max_pages == 0 {
            anyhow::bail!("max_pages must be greater than 0");
        }

        if self.crawler.concurrency == 0 {
            anyhow::bail!("concurrency must be greater than 0");
        }

        if !(0.0..=1.0).contains(&self.crawler.min_relevance) {
            anyhow::bail!("min_relevance must be within [0, 1]");
        }

        if self.crawler.branching_estimate == 0 {
            anyhow::bail!("branching_estimate must be greater than 0");
        }

        if self.output.format != "json" && self.output.format != "text" {
            anyhow::bail!("output format must be 'json' or 'text'");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.request_timeout_secs)
    }

    /// Get the per-domain politeness delay as Duration
    #[must_use]
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.crawler.politeness_delay_ms)
    }
}

impl CrawlerConfig {
    /// Clamp a requested page budget to the hard ceiling
    pub fn clamp_max_pages(&self, requested: usize) -> usize {
        requested.max(1).min(MAX_PAGES_CEILING)
    }

    /// Clamp a requested depth to the hard ceiling
    pub fn clamp_max_depth(&self, requested: usize) -> usize {
        requested.min(MAX_DEPTH_CEILING)
    }

    /// Clamp a requested worker pool size to the hard ceiling
    pub fn clamp_concurrency(&self, requested: usize) -> usize {
        requested.max(1).min(MAX_CONCURRENCY)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
