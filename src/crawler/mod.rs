//! Bounded, prioritized, concurrent frontier crawl
//!
//! The run loop owns the frontier outright (single-owner discipline: workers
//! never touch it, they only hand outcomes back), dispatches fetch+extract
//! units into a fixed-size worker pool, and applies the strategy's acceptance
//! filter and termination rules as outcomes arrive.
//!
//! Per-page failures are recorded and skipped; the run itself fails only when
//! not a single page could be processed.

pub mod fetcher;
pub mod frontier;

pub use fetcher::PageFetcher;
pub use frontier::{Frontier, FrontierEntry, PushOutcome};

use crate::config::CrawlerConfig;
use crate::error::Error;
use crate::extractor::ContentExtractor;
use crate::models::{CrawlPhase, CrawlResult, CrawlStats, CrawlStrategy, TerminationRule};
use crate::utils::error::{CrawlError, RenderError};
use crate::utils::{normalize_url, same_registered_domain};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Optional JavaScript rendering collaborator.
///
/// When a strategy flags a site as script-dependent and a renderer is
/// registered, it is tried before the static fetcher; any failure (or no
/// renderer at all) degrades to a static fetch.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Produce rendered HTML for a URL
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

/// The result of one crawl run
#[derive(Debug)]
pub struct CrawlReport {
    /// Accepted results, in completion order
    pub results: Vec<CrawlResult>,

    /// Run statistics
    pub stats: CrawlStats,

    /// Terminal phase (`Completed`, or `Aborted` via the error path)
    pub phase: CrawlPhase,
}

/// One worker's outcome, handed back to the run loop
struct PageOutcome {
    url: String,
    result: Result<CrawlResult, Error>,
}

/// Frontier-driven site crawler
pub struct Crawler {
    fetcher: Arc<PageFetcher>,
    extractor: Arc<ContentExtractor>,
    renderer: Option<Arc<dyn PageRenderer>>,
    concurrency: usize,
    same_domain_only: bool,
    branching_estimate: usize,
}

impl Crawler {
    /// Create a crawler from its collaborators and configuration
    pub fn new(
        fetcher: Arc<PageFetcher>,
        extractor: Arc<ContentExtractor>,
        config: &CrawlerConfig,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            renderer: None,
            concurrency: config.clamp_concurrency(config.concurrency),
            same_domain_only: config.same_domain_only,
            branching_estimate: config.branching_estimate,
        }
    }

    /// Register a rendering collaborator
    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Crawl a site starting from `seed_url` under the given strategy.
    ///
    /// Cancellation stops dispatching promptly; in-flight fetches drain and
    /// their accepted results are included, so a cancelled run completes with
    /// partial results rather than failing.
    ///
    /// # Errors
    ///
    /// `CrawlError::InvalidSeed` for an unusable seed URL, and
    /// `CrawlError::NoProgress` when the frontier is exhausted without a
    /// single successfully processed page.
    pub async fn run(
        &self,
        seed_url: &str,
        strategy: &CrawlStrategy,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, CrawlError> {
        let seed = normalize_url(seed_url)
            .ok_or_else(|| CrawlError::InvalidSeed(seed_url.to_string()))?;

        let capacity = strategy.max_pages.saturating_mul(self.branching_estimate);
        let mut frontier = Frontier::with_capacity(capacity.max(1));
        frontier.push(FrontierEntry {
            url: seed.clone(),
            depth: 0,
            priority: f64::INFINITY,
        });

        let strategy = Arc::new(strategy.clone());
        let started = Instant::now();
        let mut tasks: JoinSet<PageOutcome> = JoinSet::new();
        let mut results: Vec<CrawlResult> = Vec::new();
        let mut dispatched = 0usize;
        let mut processed = 0usize;
        let mut failures = 0usize;
        let mut consecutive_irrelevant = 0usize;
        let mut stop_dispatch = false;

        loop {
            if cancel.is_cancelled() && !stop_dispatch {
                tracing::info!("Cancellation requested, draining in-flight fetches");
                stop_dispatch = true;
            }

            while !stop_dispatch && tasks.len() < self.concurrency && dispatched < strategy.max_pages
            {
                let Some(entry) = frontier.pop() else { break };
                dispatched += 1;
                tracing::debug!(url = %entry.url, depth = entry.depth, "Dispatching fetch");

                let fetcher = Arc::clone(&self.fetcher);
                let extractor = Arc::clone(&self.extractor);
                let renderer = self.renderer.clone();
                let strategy = Arc::clone(&strategy);
                tasks.spawn(async move {
                    process_page(fetcher, extractor, renderer, strategy, entry).await
                });
            }

            let Some(joined) = tasks.join_next().await else {
                // nothing in flight and nothing dispatched: frontier empty,
                // page budget reached, or dispatch stopped
                break;
            };

            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    failures += 1;
                    tracing::warn!(error = %e, "Crawl worker panicked");
                    continue;
                }
            };

            match outcome.result {
                Ok(page) => {
                    processed += 1;
                    let accepted = page.relevance_score >= strategy.min_relevance
                        && strategy.accepts(page.content_type);

                    if accepted {
                        consecutive_irrelevant = 0;
                    } else {
                        consecutive_irrelevant += 1;
                    }

                    // Rejected hub pages may still contribute links when the
                    // strategy says so; their content is always discarded.
                    let follow = (accepted || strategy.follow_hub_links)
                        && page.depth < strategy.max_depth
                        && !stop_dispatch;

                    if follow {
                        for link in &page.outbound_links {
                            if self.same_domain_only
                                && !same_registered_domain(&seed, &link.url)
                            {
                                continue;
                            }
                            frontier.push(FrontierEntry {
                                url: link.url.clone(),
                                depth: page.depth + 1,
                                priority: link.priority,
                            });
                        }
                    }

                    if accepted {
                        tracing::debug!(
                            url = %page.url,
                            score = page.relevance_score,
                            content_type = %page.content_type,
                            "Page accepted"
                        );
                        results.push(page);
                    } else {
                        tracing::debug!(
                            url = %page.url,
                            score = page.relevance_score,
                            "Page rejected by strategy"
                        );
                    }
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(url = %outcome.url, error = %e, "Page failed, skipping");
                }
            }

            if !stop_dispatch && termination_met(&strategy.termination, consecutive_irrelevant) {
                tracing::info!(
                    consecutive_irrelevant,
                    "Termination rule met, stopping dispatch"
                );
                stop_dispatch = true;
            }
        }

        let stats = CrawlStats {
            pages_fetched: dispatched,
            pages_accepted: results.len(),
            failures,
            duration_secs: started.elapsed().as_secs(),
        };

        if processed == 0 && !cancel.is_cancelled() {
            tracing::error!(attempted = dispatched, "Crawl made no progress");
            return Err(CrawlError::NoProgress {
                attempted: dispatched,
            });
        }

        tracing::info!(
            pages_fetched = stats.pages_fetched,
            pages_accepted = stats.pages_accepted,
            failures = stats.failures,
            duration_secs = stats.duration_secs,
            "Crawl complete"
        );

        // a cancelled run still completes with whatever it gathered
        Ok(CrawlReport {
            results,
            stats,
            phase: CrawlPhase::Completed,
        })
    }
}

/// Check strategy termination rules against the current run state
fn termination_met(rules: &[TerminationRule], consecutive_irrelevant: usize) -> bool {
    rules.iter().any(|rule| match rule {
        TerminationRule::ConsecutiveIrrelevant { limit } => consecutive_irrelevant >= *limit,
    })
}

/// One unit of worker-pool work: fetch (or render) and extract a page
async fn process_page(
    fetcher: Arc<PageFetcher>,
    extractor: Arc<ContentExtractor>,
    renderer: Option<Arc<dyn PageRenderer>>,
    strategy: Arc<CrawlStrategy>,
    entry: FrontierEntry,
) -> PageOutcome {
    let url = entry.url;

    let html = fetch_page(&fetcher, renderer.as_deref(), &strategy, &url).await;

    let result = match html {
        Ok(html) => extractor
            .extract(&html, &url, entry.depth, &strategy)
            .await
            .map_err(Error::from),
        Err(e) => Err(e),
    };

    PageOutcome { url, result }
}

async fn fetch_page(
    fetcher: &PageFetcher,
    renderer: Option<&dyn PageRenderer>,
    strategy: &CrawlStrategy,
    url: &str,
) -> Result<String, Error> {
    if strategy.needs_rendering {
        match renderer {
            Some(renderer) => match renderer.render(url).await {
                Ok(html) => return Ok(html),
                Err(e) => {
                    tracing::debug!(url, error = %e, "Rendering failed, using static fetch");
                }
            },
            None => {
                tracing::debug!(url, "No renderer registered, using static fetch");
            }
        }
    }

    Ok(fetcher.fetch(url).await?)
}
