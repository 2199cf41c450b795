//! Document persistence
//!
//! Writes synthesized documents to disk as a JSON array or a plain-text
//! digest. Each save produces a fresh UUID-tagged file next to the configured
//! base path, so repeated runs never clobber earlier output.

use crate::config::OutputConfig;
use crate::error::{Error, Result};
use crate::models::Document;
use std::path::PathBuf;
use uuid::Uuid;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    /// Parse a format label from config or CLI
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" | "txt" => Some(Self::Text),
            _ => None,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "txt",
        }
    }
}

/// Writes documents to UUID-tagged output files
pub struct DocumentWriter {
    base_path: String,
    format: OutputFormat,
}

impl DocumentWriter {
    /// Create a writer from output configuration
    ///
    /// # Errors
    ///
    /// Returns a config error for an unrecognized format label.
    pub fn new(config: &OutputConfig) -> Result<Self> {
        let format = OutputFormat::parse(&config.format)
            .ok_or_else(|| Error::config(format!("unknown output format: {}", config.format)))?;

        Ok(Self {
            base_path: config.base_path.clone(),
            format,
        })
    }

    /// Write all documents to one new file and return its path
    pub async fn save(&self, documents: &[Document]) -> Result<PathBuf> {
        let path = PathBuf::from(format!(
            "{}_{}.{}",
            self.base_path,
            Uuid::new_v4(),
            self.format.extension()
        ));

        let body = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(documents)?,
            OutputFormat::Text => render_text(documents),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&path, body).await?;

        tracing::info!(path = %path.display(), documents = documents.len(), "Documents saved");
        Ok(path)
    }
}

fn render_text(documents: &[Document]) -> String {
    let mut sections = Vec::with_capacity(documents.len());

    for doc in documents {
        let mut section = format!("=== {} ===\n\n{}\n", doc.title, doc.content);
        if doc.metadata.degraded {
            section.push_str("\n[unsynthesized raw content]\n");
        }
        section.push_str(&format!("\nSources: {}\n", doc.metadata.source_urls.join(", ")));
        sections.push(section);
    }

    sections.join(&format!("\n{}\n\n", "-".repeat(80)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;

    fn doc(title: &str, degraded: bool) -> Document {
        Document::new(
            ContentType::Faq,
            title,
            "Q: how?\nA: like this.",
            vec!["https://a.test/faq".to_string()],
            "get the faq",
            degraded,
        )
    }

    fn writer_in(dir: &std::path::Path, format: &str) -> DocumentWriter {
        DocumentWriter::new(&OutputConfig {
            format: format.to_string(),
            base_path: dir.join("out").to_string_lossy().into_owned(),
        })
        .unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse(" TEXT "), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::parse("txt"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::parse("yaml"), None);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = DocumentWriter::new(&OutputConfig {
            format: "yaml".to_string(),
            base_path: "x".to_string(),
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer_in(dir.path(), "json");

        let path = writer.save(&[doc("Help Center", false)]).await.unwrap();
        assert_eq!(path.extension().unwrap(), "json");

        let body = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: Vec<Document> = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title, "Help Center");
        assert_eq!(parsed[0].doc_type, ContentType::Faq);
    }

    #[tokio::test]
    async fn test_text_output_carries_sources() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer_in(dir.path(), "text");

        let path = writer
            .save(&[doc("Help Center", false), doc("More Help", true)])
            .await
            .unwrap();

        let body = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(body.contains("=== Help Center ==="));
        assert!(body.contains("Sources: https://a.test/faq"));
        assert!(body.contains(&"-".repeat(80)));
        assert!(body.contains("[unsynthesized raw content]"));
    }

    #[tokio::test]
    async fn test_repeated_saves_never_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer_in(dir.path(), "json");

        let a = writer.save(&[doc("A", false)]).await.unwrap();
        let b = writer.save(&[doc("B", false)]).await.unwrap();
        assert_ne!(a, b);
        assert!(a.exists() && b.exists());
    }
}
