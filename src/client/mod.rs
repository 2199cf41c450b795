//! Top-level orchestration
//!
//! [`RufusClient`] wires the strategy builder, crawler, and synthesizer
//! together behind one `scrape` call: instruction in, RAG-ready documents
//! out.

use crate::config::Config;
use crate::crawler::{Crawler, PageFetcher, PageRenderer};
use crate::error::{Error, Result};
use crate::extractor::ContentExtractor;
use crate::llm::{CompletionModel, OllamaClient};
use crate::models::Document;
use crate::strategy::StrategyBuilder;
use crate::synthesizer::DocumentSynthesizer;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Instruction-driven scraping client
pub struct RufusClient {
    strategy_builder: StrategyBuilder,
    crawler: Crawler,
    synthesizer: DocumentSynthesizer,
}

impl RufusClient {
    /// Create a client with an Ollama-backed completion model
    ///
    /// # Errors
    ///
    /// Returns a config error for an invalid configuration, or a fetch error
    /// if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let llm: Arc<dyn CompletionModel> =
            Arc::new(OllamaClient::with_config(config.llm.clone())?);
        Self::with_model(config, llm)
    }

    /// Create a client with a caller-supplied completion model
    pub fn with_model(config: Config, llm: Arc<dyn CompletionModel>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::config(e.to_string()))?;

        let fetcher = Arc::new(PageFetcher::new(
            config.request_timeout(),
            config.politeness_delay(),
        )?);
        let extractor = Arc::new(ContentExtractor::new(
            Arc::clone(&llm),
            &config.extractor,
        ));

        Ok(Self {
            strategy_builder: StrategyBuilder::new(Arc::clone(&llm), config.crawler.clone()),
            crawler: Crawler::new(fetcher, extractor, &config.crawler),
            synthesizer: DocumentSynthesizer::new(llm, &config.synthesis),
        })
    }

    /// Register a rendering collaborator for script-dependent sites
    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.crawler = self.crawler.with_renderer(renderer);
        self
    }

    /// Crawl `seed_url` under `instruction` and synthesize documents
    pub async fn scrape(&self, seed_url: &str, instruction: &str) -> Result<Vec<Document>> {
        self.scrape_with_cancel(seed_url, instruction, CancellationToken::new())
            .await
    }

    /// Like [`scrape`](Self::scrape), but cancellable. Cancellation stops the
    /// crawl promptly and synthesizes whatever was gathered.
    pub async fn scrape_with_cancel(
        &self,
        seed_url: &str,
        instruction: &str,
        cancel: CancellationToken,
    ) -> Result<Vec<Document>> {
        tracing::info!(seed_url, instruction, "Starting scrape");

        let strategy = self.strategy_builder.build(instruction, seed_url).await?;
        let report = self.crawler.run(seed_url, &strategy, cancel).await?;

        tracing::info!(
            pages_accepted = report.stats.pages_accepted,
            failure_rate = format!("{:.1}%", report.stats.failure_rate()),
            "Crawl finished, synthesizing"
        );

        let documents = self
            .synthesizer
            .synthesize(&report.results, instruction)
            .await?;

        tracing::info!(documents = documents.len(), "Scrape complete");
        Ok(documents)
    }
}
