//! HTTP page fetcher with per-domain politeness
//!
//! One fetch per frontier entry, no in-run retries: a failed page is recorded
//! and skipped by the crawler. Politeness is a keyed rate limiter, one key
//! per registered domain, so a large worker pool still cannot hammer a single
//! host even when the crawl spans several domains.

use crate::utils::error::FetchError;
use crate::utils::registered_domain;
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};
use rand::seq::SliceRandom;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    Client,
};
use std::time::Duration;
use url::Url;

/// Pool of User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "rufus/0.1 (+https://github.com/rufus-rs/rufus) web data extraction for RAG",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 rufus/0.1",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 rufus/0.1",
];

type DomainLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// HTTP fetcher shared by all crawl workers
pub struct PageFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Per-domain politeness limiter; `None` when the delay is zero
    limiter: Option<DomainLimiter>,
}

impl PageFetcher {
    /// Create a fetcher
    ///
    /// # Arguments
    ///
    /// * `timeout` - per-request timeout
    /// * `politeness_delay` - minimum spacing between requests to one domain
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(timeout: Duration, politeness_delay: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let limiter = Quota::with_period(politeness_delay).map(RateLimiter::keyed);

        Ok(Self { client, limiter })
    }

    /// Fetch a page, honoring the per-domain politeness delay.
    ///
    /// The caller must not hold any shared lock across this call: waiting on
    /// the domain cooldown can take a full politeness period.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| FetchError::InvalidUrl(format!("no host in {url}")))?;

        if let Some(limiter) = &self.limiter {
            limiter.until_key_ready(&registered_domain(host)).await;
        }

        let response = self
            .client
            .get(parsed)
            .headers(self.build_headers())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else if e.is_connect() {
                    FetchError::Connect(e.to_string())
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();
        if let Some(err) = Self::classify_status(status.as_u16()) {
            return Err(err);
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e)
            }
        })
    }

    /// Map a non-success status code to its error
    fn classify_status(status: u16) -> Option<FetchError> {
        match status {
            200..=299 => None,
            400..=499 => Some(FetchError::ClientError(status)),
            500..=599 => Some(FetchError::ServerError(status)),
            other => Some(FetchError::UnexpectedStatus(other)),
        }
    }

    /// Build request headers with a rotated user agent
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(self.random_user_agent()));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );

        headers
    }

    fn random_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).copied().unwrap_or(USER_AGENTS[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> PageFetcher {
        PageFetcher::new(Duration::from_secs(5), Duration::from_millis(10)).unwrap()
    }

    #[test]
    fn test_fetcher_creation() {
        assert!(PageFetcher::new(Duration::from_secs(5), Duration::from_millis(100)).is_ok());
        // zero delay disables the limiter rather than failing
        let f = PageFetcher::new(Duration::from_secs(5), Duration::ZERO).unwrap();
        assert!(f.limiter.is_none());
    }

    #[test]
    fn test_status_classification() {
        assert!(PageFetcher::classify_status(200).is_none());
        assert!(PageFetcher::classify_status(204).is_none());

        assert!(matches!(
            PageFetcher::classify_status(404),
            Some(FetchError::ClientError(404))
        ));
        assert!(matches!(
            PageFetcher::classify_status(503),
            Some(FetchError::ServerError(503))
        ));
        // redirects are followed by the client; one surfacing here is not a
        // server fault
        assert!(matches!(
            PageFetcher::classify_status(301),
            Some(FetchError::UnexpectedStatus(301))
        ));
        assert!(matches!(
            PageFetcher::classify_status(102),
            Some(FetchError::UnexpectedStatus(102))
        ));
    }

    #[test]
    fn test_user_agent_rotation() {
        let fetcher = fetcher();

        let mut agents = std::collections::HashSet::new();
        for _ in 0..100 {
            let agent = fetcher.random_user_agent();
            assert!(USER_AGENTS.contains(&agent));
            agents.insert(agent);
        }

        assert!(agents.len() > 1, "User agents should rotate");
    }

    #[test]
    fn test_headers() {
        let fetcher = fetcher();
        let headers = fetcher.build_headers();

        assert!(headers.contains_key(USER_AGENT));
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let fetcher = fetcher();
        let result = fetcher.fetch("not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_politeness_spacing_per_domain() {
        let fetcher =
            PageFetcher::new(Duration::from_secs(5), Duration::from_millis(50)).unwrap();
        let limiter = fetcher.limiter.as_ref().unwrap();

        let start = std::time::Instant::now();
        limiter.until_key_ready(&"example.com".to_string()).await;
        limiter.until_key_ready(&"example.com".to_string()).await;
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(40),
            "second request to the same domain should wait, waited {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn test_politeness_independent_across_domains() {
        let fetcher =
            PageFetcher::new(Duration::from_secs(5), Duration::from_millis(200)).unwrap();
        let limiter = fetcher.limiter.as_ref().unwrap();

        let start = std::time::Instant::now();
        limiter.until_key_ready(&"one.test".to_string()).await;
        limiter.until_key_ready(&"two.test".to_string()).await;
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_millis(100),
            "different domains must not share a cooldown, waited {elapsed:?}"
        );
    }
}
