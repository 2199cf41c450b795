//! Error types for the rufus crawler
//!
//! This module defines the domain-specific error enums used throughout the
//! crate. The unified wrapper lives in [`crate::error`].

use thiserror::Error;

/// Errors that can occur while fetching a page over HTTP
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Connection failure (DNS resolution or refused connection)
    #[error("Connection failed: {0}")]
    Connect(String),

    /// 4xx response
    #[error("Client error: HTTP {0}")]
    ClientError(u16),

    /// 5xx response
    #[error("Server error: HTTP {0}")]
    ServerError(u16),

    /// Status outside the expected classes, e.g. a 3xx the client did not
    /// follow
    #[error("Unexpected status: HTTP {0}")]
    UnexpectedStatus(u16),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors from the optional JavaScript rendering collaborator
#[derive(Error, Debug)]
pub enum RenderError {
    /// No renderer is registered
    #[error("No renderer available")]
    Unavailable,

    /// Renderer failed on this page
    #[error("Rendering failed: {0}")]
    Failed(String),
}

/// Errors that can occur while extracting content from HTML
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Empty or whitespace-only HTML input
    #[error("Empty HTML document")]
    EmptyDocument,

    /// Parsed document contains no extractable text
    #[error("No text content found in document")]
    NoContent,
}

/// Errors from the text-completion collaborator
#[derive(Error, Debug)]
pub enum LlmError {
    /// HTTP transport failure
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint unreachable or returned a non-success status
    #[error("LLM endpoint unreachable: {0}")]
    Unreachable(String),

    /// Response could not be parsed into the expected shape
    #[error("Malformed LLM response: {0}")]
    Malformed(String),

    /// Request timed out
    #[error("LLM request timeout")]
    Timeout,
}

/// Fatal failure to derive a crawl strategy from an instruction
#[derive(Error, Debug)]
pub enum StrategyError {
    /// The classification collaborator failed on the initial call and the retry
    #[error("Strategy derivation failed after retry: {0}")]
    LlmFailed(#[source] LlmError),

    /// The collaborator replied but the response never matched the schema
    #[error("Unparsable strategy response after retry: {0}")]
    InvalidResponse(String),
}

/// Fatal crawl failure: no page was ever successfully processed
#[derive(Error, Debug)]
pub enum CrawlError {
    /// Frontier exhausted with zero successfully processed pages
    #[error("Crawl made no progress: {attempted} fetch attempts, all failed")]
    NoProgress {
        /// Number of fetch attempts made before giving up
        attempted: usize,
    },

    /// Seed URL could not be parsed
    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),
}

/// Fatal synthesis failure: every content-type group failed
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The synthesis collaborator failed for all groups
    #[error("Synthesis failed for all {groups} content groups")]
    AllGroupsFailed {
        /// Number of groups attempted
        groups: usize,
    },
}
