//! Unified error handling for the rufus crate
//!
//! Domain-specific errors live in [`crate::utils::error`]; this module wraps
//! them in a single [`Error`] enum so they can cross module boundaries without
//! losing detail, and classifies them for handling strategies.

use std::io;
use thiserror::Error;

pub use crate::utils::error::{
    CrawlError, ExtractError, FetchError, LlmError, RenderError, StrategyError, SynthesisError,
};

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rendering)
    Network,
    /// Parsing and content extraction errors
    Extraction,
    /// LLM collaborator errors
    Llm,
    /// Storage and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the rufus crate
#[derive(Error, Debug)]
pub enum Error {
    /// Page fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Rendering collaborator errors
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Content extraction errors
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// LLM collaborator errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Strategy derivation failure (fatal)
    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    /// Total crawl failure (fatal)
    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    /// Total synthesis failure (fatal)
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is recoverable within a crawl run.
    ///
    /// Recoverable errors are absorbed per-page or per-group; unrecoverable
    /// ones propagate to the `scrape` caller.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(_) | Self::Render(_) | Self::Extract(_) | Self::Llm(_) => true,
            Self::Strategy(_) | Self::Crawl(_) | Self::Synthesis(_) => false,
            Self::Io(_) => true,
            Self::Json(_) | Self::Config(_) => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) | Self::Render(_) | Self::Crawl(_) => ErrorCategory::Network,
            Self::Extract(_) | Self::Json(_) => ErrorCategory::Extraction,
            Self::Llm(_) | Self::Strategy(_) | Self::Synthesis(_) => ErrorCategory::Llm,
            Self::Io(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
