// Core data structures for the rufus crawler

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification label used to group pages and tailor synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Faq,
    Product,
    Pricing,
    About,
    Blog,
    Generic,
}

impl ContentType {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faq => "faq",
            Self::Product => "product",
            Self::Pricing => "pricing",
            Self::About => "about",
            Self::Blog => "blog",
            Self::Generic => "generic",
        }
    }

    /// Create from a free-form label (LLM output, URLs, config)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "faq" | "help" | "support" => Some(Self::Faq),
            "product" | "products" | "feature" | "features" | "service" => Some(Self::Product),
            "pricing" | "price" | "plans" | "subscription" => Some(Self::Pricing),
            "about" | "contact" | "company" | "team" => Some(Self::About),
            "blog" | "news" | "article" => Some(Self::Blog),
            "generic" | "general" | "all" => Some(Self::Generic),
            _ => None,
        }
    }

    /// Get all known types, including the Generic fallback
    pub fn all() -> Vec<Self> {
        vec![
            Self::Faq,
            Self::Product,
            Self::Pricing,
            Self::About,
            Self::Blog,
            Self::Generic,
        ]
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strategy-supplied early-termination rule, checked after every page outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum TerminationRule {
    /// Stop after this many consecutive pages below the relevance floor
    ConsecutiveIrrelevant { limit: usize },
}

/// Crawl strategy derived from the user instruction.
///
/// Immutable once built; the crawler and extractor read it, only the
/// [`StrategyBuilder`](crate::strategy::StrategyBuilder) creates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlStrategy {
    /// Keywords to score page content against
    pub keywords: Vec<String>,

    /// Content types worth keeping; empty means accept all
    pub target_types: Vec<ContentType>,

    /// Relevance floor in [0, 1]
    pub min_relevance: f64,

    /// Maximum pages to fetch in this run
    pub max_pages: usize,

    /// Maximum link depth from the seed (seed is depth 0)
    pub max_depth: usize,

    /// Whether pages on this site need script execution to produce content
    pub needs_rendering: bool,

    /// Follow links out of rejected pages (hub pages leading to relevant leaves)
    pub follow_hub_links: bool,

    /// Early-termination rules
    pub termination: Vec<TerminationRule>,

    /// One-line task summary used in scoring and synthesis prompts
    pub task: String,
}

impl CrawlStrategy {
    /// Whether a page of this type should be kept under this strategy
    pub fn accepts(&self, content_type: ContentType) -> bool {
        self.target_types.is_empty() || self.target_types.contains(&content_type)
    }
}

impl Default for CrawlStrategy {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            target_types: Vec::new(),
            min_relevance: 0.3,
            max_pages: 30,
            max_depth: 3,
            needs_rendering: false,
            follow_hub_links: true,
            termination: Vec::new(),
            task: String::new(),
        }
    }
}

/// An outbound link discovered on a page, with its predicted crawl priority
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundLink {
    /// Normalized absolute URL
    pub url: String,

    /// Anchor text, whitespace-normalized
    pub anchor_text: String,

    /// Predicted priority in [0, 1], higher is better
    pub priority: f64,
}

/// The result of fetching and extracting a single page.
///
/// Created once per successfully processed page; immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Normalized absolute page URL
    pub url: String,

    /// Link depth from the seed
    pub depth: usize,

    /// Page title (falls back to the URL when absent)
    pub title: String,

    /// Cleaned main-content text
    pub content: String,

    /// Detected content type
    pub content_type: ContentType,

    /// Relevance score in [0, 1]
    pub relevance_score: f64,

    /// Outbound links sorted by descending priority
    pub outbound_links: Vec<OutboundLink>,

    /// Fetch timestamp
    pub fetched_at: DateTime<Utc>,
}

/// Metadata attached to every synthesized document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// URLs of every page that contributed to the synthesis input
    pub source_urls: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// The user instruction that drove the crawl
    pub instruction: String,

    /// True when synthesis failed and the content is a raw pass-through
    pub degraded: bool,
}

/// A synthesized document ready for RAG ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Content-type group this document was synthesized from
    #[serde(rename = "type")]
    pub doc_type: ContentType,

    /// Document title
    pub title: String,

    /// Synthesized content
    pub content: String,

    /// Provenance and fidelity metadata
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a document with standard metadata
    pub fn new(
        doc_type: ContentType,
        title: impl Into<String>,
        content: impl Into<String>,
        source_urls: Vec<String>,
        instruction: impl Into<String>,
        degraded: bool,
    ) -> Self {
        Self {
            doc_type,
            title: title.into(),
            content: content.into(),
            metadata: DocumentMetadata {
                source_urls,
                created_at: Utc::now(),
                instruction: instruction.into(),
                degraded,
            },
        }
    }
}

/// Crawl job lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrawlPhase {
    Init,
    Running,
    Completed,
    Aborted,
}

/// Statistics for a completed crawl run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlStats {
    /// Pages dispatched for fetching
    pub pages_fetched: usize,

    /// Pages that passed the relevance and type filters
    pub pages_accepted: usize,

    /// Fetch or extraction failures
    pub failures: usize,

    /// Run duration in seconds
    pub duration_secs: u64,
}

impl CrawlStats {
    /// Failure rate as a percentage of dispatched pages
    pub fn failure_rate(&self) -> f64 {
        if self.pages_fetched == 0 {
            0.0
        } else {
            (self.failures as f64 / self.pages_fetched as f64) * 100.0
        }
    }
}
