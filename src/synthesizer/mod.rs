//! Per-type document synthesis
//!
//! Groups accepted crawl results by content type, selects the
//! highest-relevance prefix of each group under a character budget, and asks
//! the completion model for one coherent document per group. A failed group
//! degrades to a concatenated pass-through document flagged in its metadata;
//! the whole operation fails only when every group fails.

use crate::config::SynthesisConfig;
use crate::llm::CompletionModel;
use crate::models::{ContentType, CrawlResult, Document};
use crate::utils::error::SynthesisError;
use crate::utils::truncate_text;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Synthesizes final documents from accepted crawl results
pub struct DocumentSynthesizer {
    llm: Arc<dyn CompletionModel>,
    budget_chars: usize,
    snippet_chars: usize,
}

impl DocumentSynthesizer {
    /// Create a synthesizer backed by the given completion model
    pub fn new(llm: Arc<dyn CompletionModel>, config: &SynthesisConfig) -> Self {
        Self {
            llm,
            budget_chars: config.budget_chars,
            snippet_chars: config.snippet_chars,
        }
    }

    /// Synthesize one document per content type present in `results`.
    ///
    /// Empty input yields an empty output. Single-result groups go through
    /// the same synthesis call as larger groups.
    ///
    /// # Errors
    ///
    /// `SynthesisError::AllGroupsFailed` when the model fails for every group.
    pub async fn synthesize(
        &self,
        results: &[CrawlResult],
        instruction: &str,
    ) -> Result<Vec<Document>, SynthesisError> {
        if results.is_empty() {
            return Ok(Vec::new());
        }

        let groups = group_by_type(results);
        let group_count = groups.len();
        let mut documents = Vec::with_capacity(group_count);
        let mut failed = 0usize;

        for (content_type, group) in groups {
            let selected = self.select_under_budget(group);
            let source_urls: Vec<String> =
                selected.iter().map(|r| r.url.clone()).collect();
            let title = group_title(content_type, &selected);

            match self.synthesize_group(content_type, &selected, instruction).await {
                Ok(content) => {
                    tracing::debug!(
                        content_type = %content_type,
                        pages = selected.len(),
                        "Group synthesized"
                    );
                    documents.push(Document::new(
                        content_type,
                        title,
                        content,
                        source_urls,
                        instruction,
                        false,
                    ));
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(
                        content_type = %content_type,
                        error = %e,
                        "Synthesis failed, degrading to pass-through"
                    );
                    documents.push(Document::new(
                        content_type,
                        title,
                        passthrough_content(&selected),
                        source_urls,
                        instruction,
                        true,
                    ));
                }
            }
        }

        if failed == group_count {
            return Err(SynthesisError::AllGroupsFailed {
                groups: group_count,
            });
        }

        Ok(documents)
    }

    /// Highest-relevance prefix whose cumulative length fits the budget.
    /// Always keeps at least one result.
    fn select_under_budget<'a>(&self, mut group: Vec<&'a CrawlResult>) -> Vec<&'a CrawlResult> {
        group.sort_by(|a, b| {
            b.relevance_score
                .total_cmp(&a.relevance_score)
                .then_with(|| a.url.cmp(&b.url))
        });

        let mut selected = Vec::new();
        let mut used = 0usize;
        for result in group {
            let len = result.content.chars().count().min(self.snippet_chars);
            if !selected.is_empty() && used + len > self.budget_chars {
                break;
            }
            used += len;
            selected.push(result);
        }
        selected
    }

    async fn synthesize_group(
        &self,
        content_type: ContentType,
        selected: &[&CrawlResult],
        instruction: &str,
    ) -> Result<String, crate::utils::error::LlmError> {
        let sources = selected
            .iter()
            .enumerate()
            .map(|(i, r)| {
                format!(
                    "Source {} ({}): {}\n{}",
                    i + 1,
                    r.url,
                    r.title,
                    truncate_text(&r.content, self.snippet_chars)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = format!(
            "{}\n\nUser request: \"{instruction}\"\n\n{sources}\n\n\
             Write the document now. Use only facts from the sources.",
            type_directive(content_type)
        );

        let content = self.llm.complete(&prompt).await?;
        let content = content.trim();
        if content.is_empty() {
            return Err(crate::utils::error::LlmError::Malformed(
                "empty synthesis response".to_string(),
            ));
        }
        Ok(content.to_string())
    }
}

/// Group results by content type; BTreeMap keeps output order stable
fn group_by_type(results: &[CrawlResult]) -> BTreeMap<ContentType, Vec<&CrawlResult>> {
    let mut groups: BTreeMap<ContentType, Vec<&CrawlResult>> = BTreeMap::new();
    for result in results {
        groups.entry(result.content_type).or_default().push(result);
    }
    groups
}

/// Per-type synthesis directive
fn type_directive(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Faq => {
            "Synthesize the following FAQ pages into one clean question-and-answer \
             document. Keep every distinct question, merge duplicates."
        }
        ContentType::Product => {
            "Synthesize the following product pages into one document describing \
             the products and their features."
        }
        ContentType::Pricing => {
            "Synthesize the following pricing pages into one document listing \
             plans, prices, and billing terms exactly as stated."
        }
        ContentType::About => {
            "Synthesize the following company pages into one document about the \
             organization, its team, and how to contact it."
        }
        ContentType::Blog => {
            "Synthesize the following articles into one document summarizing \
             each article's key points with its publication context."
        }
        ContentType::Generic => {
            "Synthesize the following pages into one coherent reference document."
        }
    }
}

/// Title for a group document, from its best page when one exists
fn group_title(content_type: ContentType, selected: &[&CrawlResult]) -> String {
    match selected.first() {
        Some(best) if !best.title.trim().is_empty() => best.title.clone(),
        _ => format!("{} document", content_type.as_str()),
    }
}

/// Raw concatenation used when synthesis fails for a group
fn passthrough_content(selected: &[&CrawlResult]) -> String {
    selected
        .iter()
        .map(|r| format!("## {} ({})\n\n{}", r.title, r.url, r.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::LlmError;
    use async_trait::async_trait;
    use chrono::Utc;

    struct FixedModel(Option<String>);

    #[async_trait]
    impl CompletionModel for FixedModel {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            match &self.0 {
                Some(text) => Ok(text.clone()),
                None => Err(LlmError::Timeout),
            }
        }
    }

    fn synthesizer(response: Option<&str>) -> DocumentSynthesizer {
        DocumentSynthesizer::new(
            Arc::new(FixedModel(response.map(String::from))),
            &SynthesisConfig::default(),
        )
    }

    fn result(url: &str, content_type: ContentType, score: f64, content: &str) -> CrawlResult {
        CrawlResult {
            url: url.to_string(),
            depth: 1,
            title: format!("Title of {url}"),
            content: content.to_string(),
            content_type,
            relevance_score: score,
            outbound_links: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_empty_input_yields_no_documents() {
        let s = synthesizer(Some("text"));
        assert!(s.synthesize(&[], "anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_document_per_content_type() {
        let s = synthesizer(Some("synthesized text"));
        let results = vec![
            result("https://a.test/faq1", ContentType::Faq, 0.9, "q and a"),
            result("https://a.test/faq2", ContentType::Faq, 0.8, "more q and a"),
            result("https://a.test/pricing", ContentType::Pricing, 0.7, "$10/month"),
        ];

        let docs = s.synthesize(&results, "get help content").await.unwrap();
        assert_eq!(docs.len(), 2);

        let faq = docs.iter().find(|d| d.doc_type == ContentType::Faq).unwrap();
        assert_eq!(faq.content, "synthesized text");
        assert!(!faq.metadata.degraded);
        assert_eq!(faq.metadata.source_urls.len(), 2);
        assert_eq!(faq.metadata.instruction, "get help content");
    }

    #[tokio::test]
    async fn test_failed_group_degrades_to_passthrough() {
        let s = synthesizer(None);
        let results = vec![result(
            "https://a.test/faq",
            ContentType::Faq,
            0.9,
            "the raw answer text",
        )];

        // single group failing means every group failed
        let err = s.synthesize(&results, "help").await.unwrap_err();
        assert!(matches!(err, SynthesisError::AllGroupsFailed { groups: 1 }));
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_degraded_document() {
        // model that fails only on FAQ prompts
        struct Selective;

        #[async_trait]
        impl CompletionModel for Selective {
            async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
                if prompt.contains("question-and-answer") {
                    Err(LlmError::Timeout)
                } else {
                    Ok("synthesized".to_string())
                }
            }
        }

        let s = DocumentSynthesizer::new(Arc::new(Selective), &SynthesisConfig::default());
        let results = vec![
            result("https://a.test/faq", ContentType::Faq, 0.9, "raw faq body"),
            result("https://a.test/pricing", ContentType::Pricing, 0.8, "$5"),
        ];

        let docs = s.synthesize(&results, "help").await.unwrap();
        assert_eq!(docs.len(), 2);

        let faq = docs.iter().find(|d| d.doc_type == ContentType::Faq).unwrap();
        assert!(faq.metadata.degraded);
        assert!(faq.content.contains("raw faq body"));
        assert!(faq.content.contains("https://a.test/faq"));

        let pricing = docs.iter().find(|d| d.doc_type == ContentType::Pricing).unwrap();
        assert!(!pricing.metadata.degraded);
    }

    #[tokio::test]
    async fn test_budget_prefix_keeps_highest_relevance() {
        let config = SynthesisConfig {
            budget_chars: 30,
            snippet_chars: 25,
        };
        let s = DocumentSynthesizer::new(Arc::new(FixedModel(Some("out".into()))), &config);

        let results = vec![
            result("https://a.test/low", ContentType::Faq, 0.4, &"x".repeat(25)),
            result("https://a.test/high", ContentType::Faq, 0.9, &"y".repeat(25)),
        ];

        let docs = s.synthesize(&results, "help").await.unwrap();
        // only the higher-relevance page fits the budget
        assert_eq!(
            docs[0].metadata.source_urls,
            vec!["https://a.test/high".to_string()]
        );
    }

    #[tokio::test]
    async fn test_oversized_single_result_still_selected() {
        let config = SynthesisConfig {
            budget_chars: 10,
            snippet_chars: 2000,
        };
        let s = DocumentSynthesizer::new(Arc::new(FixedModel(Some("out".into()))), &config);

        let results = vec![result(
            "https://a.test/big",
            ContentType::Generic,
            0.9,
            &"z".repeat(5000),
        )];

        let docs = s.synthesize(&results, "help").await.unwrap();
        assert_eq!(docs[0].metadata.source_urls.len(), 1);
    }
}
