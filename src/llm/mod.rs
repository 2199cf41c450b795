//! Text-completion collaborator
//!
//! This module defines the [`CompletionModel`] seam used by the strategy
//! builder, the extractor's semantic scoring tier, and the synthesizer, plus
//! an Ollama-backed implementation and helpers for digging JSON out of
//! code-fenced model output.

use crate::utils::error::LlmError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the LLM collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama endpoint URL
    pub endpoint: String,

    /// Model name to use
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature for generation (0.0 - 1.0)
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "qwen2.5:7b".to_string(),
            timeout_secs: 60,
            max_tokens: 2048,
            temperature: 0.1,
        }
    }
}

impl LlmConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: std::env::var("RUFUS_LLM_ENDPOINT").unwrap_or(defaults.endpoint),
            model: std::env::var("RUFUS_LLM_MODEL").unwrap_or(defaults.model),
            timeout_secs: std::env::var("RUFUS_LLM_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            max_tokens: std::env::var("RUFUS_LLM_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_tokens),
            temperature: std::env::var("RUFUS_LLM_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.temperature),
        }
    }
}

/// The text-completion collaborator interface.
///
/// One prompt in, one completion out. Callers own prompt construction and
/// response parsing; implementations own transport and timeouts.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Run one completion
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Ollama generate request
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

/// Ollama generation options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama generate response
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Ollama-backed completion client
pub struct OllamaClient {
    client: Client,
    config: LlmConfig,
}

impl OllamaClient {
    /// Create a new client with default config
    pub fn new() -> Result<Self, LlmError> {
        Self::with_config(LlmConfig::default())
    }

    /// Create a new client with custom config
    pub fn with_config(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self, LlmError> {
        Self::with_config(LlmConfig::from_env())
    }

    /// Check if the endpoint is reachable
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.config.endpoint);
        self.client.get(&url).send().await.is_ok()
    }
}

#[async_trait]
impl CompletionModel for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.config.endpoint);

        let request = OllamaRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Unreachable(format!("{status}: {body}")));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        Ok(ollama_response.response)
    }
}

/// Extract a JSON object from model output.
///
/// Tries, in order: a ```json fenced block, a generic fenced block, and the
/// outermost brace pair. Models rarely reply with bare JSON even when asked.
pub fn extract_json(text: &str) -> String {
    if let Some(start) = text.find("```json") {
        if let Some(end) = text[start + 7..].find("```") {
            return text[start + 7..start + 7 + end].trim().to_string();
        }
    }

    if let Some(start) = text.find("```") {
        let after_start = &text[start + 3..];
        // Skip language identifier if present
        let content_start = after_start.find('\n').map(|i| i + 1).unwrap_or(0);
        if let Some(end) = after_start[content_start..].find("```") {
            return after_start[content_start..content_start + end]
                .trim()
                .to_string();
        }
    }

    if let Some(start) = text.find('{') {
        if let Some(end) = text.rfind('}') {
            if end > start {
                return text[start..=end].to_string();
            }
        }
    }

    text.trim().to_string()
}

/// Parse a bare numeric score in [0, 1] from model output.
///
/// Accepts surrounding prose; takes the first number found and clamps it.
pub fn parse_score(text: &str) -> Result<f64, LlmError> {
    let trimmed = text.trim();

    if let Ok(score) = trimmed.parse::<f64>() {
        return Ok(score.clamp(0.0, 1.0));
    }

    let mut number = String::new();
    for c in trimmed.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
        } else if !number.is_empty() {
            break;
        }
    }

    number
        .parse::<f64>()
        .map(|s| s.clamp(0.0, 1.0))
        .map_err(|_| LlmError::Malformed(format!("no numeric score in: {trimmed}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LlmConfig::default();
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_extract_json_from_code_block() {
        let text = "Here is the strategy:\n```json\n{\"keywords\": [\"faq\"]}\n```\n";
        assert_eq!(extract_json(text), r#"{"keywords": ["faq"]}"#);
    }

    #[test]
    fn test_extract_json_from_generic_block() {
        let text = "```\n{\"keywords\": []}\n```";
        assert_eq!(extract_json(text), r#"{"keywords": []}"#);
    }

    #[test]
    fn test_extract_json_raw() {
        let text = r#"Sure! {"keywords": ["pricing"]} hope that helps"#;
        assert_eq!(extract_json(text), r#"{"keywords": ["pricing"]}"#);
    }

    #[test]
    fn test_extract_json_passthrough() {
        assert_eq!(extract_json("  plain text  "), "plain text");
    }

    #[test]
    fn test_parse_score_bare() {
        assert_eq!(parse_score("0.75").unwrap(), 0.75);
        assert_eq!(parse_score(" 0.3\n").unwrap(), 0.3);
    }

    #[test]
    fn test_parse_score_with_prose() {
        assert_eq!(parse_score("Relevance: 0.9 out of 1").unwrap(), 0.9);
    }

    #[test]
    fn test_parse_score_clamped() {
        assert_eq!(parse_score("1.7").unwrap(), 1.0);
    }

    #[test]
    fn test_parse_score_rejects_no_number() {
        assert!(parse_score("not relevant").is_err());
    }
}
