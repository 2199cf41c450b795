use anyhow::{Context, Result};
use clap::Parser;
use rufus::client::RufusClient;
use rufus::config::Config;
use rufus::storage::DocumentWriter;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "rufus",
    version,
    about = "Instruction-guided web scraper producing RAG-ready documents",
    long_about = None
)]
struct Cli {
    /// Seed URL to start crawling from
    url: String,

    /// What to look for, in plain English
    #[arg(short, long, default_value = "")]
    instructions: String,

    /// Maximum pages to fetch
    #[arg(long)]
    max_pages: Option<usize>,

    /// Maximum link depth from the seed
    #[arg(long)]
    max_depth: Option<usize>,

    /// Concurrent fetch workers
    #[arg(long)]
    concurrency: Option<usize>,

    /// Relevance floor in [0, 1]
    #[arg(long)]
    min_relevance: Option<f64>,

    /// Output format (json, text)
    #[arg(short, long)]
    format: Option<String>,

    /// Output base path; a UUID tag and extension are appended
    #[arg(short, long)]
    output: Option<String>,

    /// TOML config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text, json); overrides the config file
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(std::path::Path::new(path))?,
        None => Config::from_env()?,
    };

    if let Some(v) = cli.max_pages {
        config.crawler.max_pages = v;
    }
    if let Some(v) = cli.max_depth {
        config.crawler.max_depth = v;
    }
    if let Some(v) = cli.concurrency {
        config.crawler.concurrency = v;
    }
    if let Some(v) = cli.min_relevance {
        config.crawler.min_relevance = v;
    }
    if let Some(v) = cli.format {
        config.output.format = v;
    }
    if let Some(v) = cli.output {
        config.output.base_path = v;
    }

    let log_format = cli
        .log_format
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    let writer = DocumentWriter::new(&config.output)?;
    let client = RufusClient::new(config).context("Failed to build client")?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight work");
            signal_cancel.cancel();
        }
    });

    let documents = client
        .scrape_with_cancel(&cli.url, &cli.instructions, cancel)
        .await?;

    if documents.is_empty() {
        println!("No relevant content found.");
        return Ok(());
    }

    let path = writer.save(&documents).await?;

    println!("Saved {} document(s) to {}", documents.len(), path.display());
    for doc in &documents {
        let flag = if doc.metadata.degraded { " (raw)" } else { "" };
        println!(
            "  [{}] {}{} ({} sources)",
            doc.doc_type,
            doc.title,
            flag,
            doc.metadata.source_urls.len()
        );
    }

    Ok(())
}

/// Filter directive from the configured level; `--verbose` wins
fn log_directive(level: &str, verbose: bool) -> String {
    if verbose {
        "rufus=debug,info".to_string()
    } else {
        format!("rufus={},warn", level.trim().to_lowercase())
    }
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::new(log_directive(level, verbose));

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
