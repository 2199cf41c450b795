//! rufus - Instruction-guided web scraping for RAG pipelines
//!
//! Point rufus at a site with a plain-English instruction and it derives a
//! crawl strategy, runs a bounded prioritized crawl, scores every page for
//! relevance, and synthesizes the accepted content into per-topic documents
//! ready for retrieval ingestion.
//!
//! # Architecture
//!
//! - [`strategy`] - Instruction-to-strategy derivation via the completion model
//! - [`crawler`] - Concurrent frontier crawl with per-domain politeness
//! - [`extractor`] - Main-content extraction, typing, and relevance scoring
//! - [`synthesizer`] - Per-content-type document synthesis
//! - [`client`] - The `scrape` orchestration entry point
//! - [`storage`] - JSON/text output files
//! - [`llm`] - Completion model trait and Ollama-backed client
//! - [`config`] - Layered configuration with hard safety ceilings
//!
//! # Example
//!
//! ```no_run
//! use rufus::client::RufusClient;
//! use rufus::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = RufusClient::new(Config::default())?;
//!     let documents = client
//!         .scrape("https://example.com", "Find FAQ and pricing information")
//!         .await?;
//!     println!("{} documents", documents.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod crawler;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod models;
pub mod storage;
pub mod strategy;
pub mod synthesizer;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::RufusClient;
    pub use crate::config::Config;
    pub use crate::crawler::{Crawler, PageRenderer};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::llm::CompletionModel;
    pub use crate::models::{ContentType, CrawlResult, CrawlStrategy, Document};
    pub use crate::storage::DocumentWriter;
}

// Direct re-exports for convenience
pub use models::{ContentType, CrawlResult, CrawlStrategy, Document};
