//! Feed reader module for sourcing proxy candidates
//!
//! This module provides functionality for:
//! - Fetching raw proxy lists from multiple upstream feeds concurrently
//! - Parsing line-oriented `host:port` text
//! - Tolerating per-feed failures without aborting the batch

use crate::error::{Error, Result};
use crate::proxy::models::{Candidate, FeedOutcome};
use futures::future;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for feed fetches in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default user agent for feed fetches
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Regex pattern to match IP:PORT pairs embedded in arbitrary text
static IP_PORT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}):(\d{1,5})\b")
        .expect("Invalid IP:PORT regex")
});

/// Configuration for the feed reader
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Timeout for each feed fetch
    pub timeout: Duration,
    /// User agent for feed fetches
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FeedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Feed reader for fetching candidates from upstream proxy list feeds
pub struct FeedReader {
    config: FeedConfig,
    client: Client,
}

impl FeedReader {
    /// Create a new feed reader with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(FeedConfig::default())
    }

    /// Create a new feed reader with custom configuration
    pub fn with_config(config: FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { config, client })
    }

    /// Fetch and parse a single feed
    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<Candidate>> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Sourcing(format!(
                "Feed {} returned HTTP {}",
                url,
                response.status()
            )));
        }
        let body = response.text().await?;
        Ok(parse_candidates(&body))
    }

    /// Fetch every feed concurrently, reporting an outcome per feed.
    ///
    /// One feed timing out or returning garbage never affects the others;
    /// its outcome simply carries zero candidates and an error reason.
    pub async fn fetch_all(&self, feeds: &[String]) -> Vec<FeedOutcome> {
        let fetches = feeds.iter().map(|url| async move {
            match self.fetch_feed(url).await {
                Ok(candidates) => {
                    debug!(feed = %url, count = candidates.len(), "feed fetched");
                    FeedOutcome::success(url.clone(), candidates)
                }
                Err(e) => {
                    warn!(feed = %url, error = %e, "feed failed");
                    FeedOutcome::failure(url.clone(), e.to_string())
                }
            }
        });

        future::join_all(fetches).await
    }

    /// Fetch all feeds and flatten their candidates into one working list.
    ///
    /// Fails only when no feed contributed a single parsable candidate.
    pub async fn source(&self, feeds: &[String]) -> Result<Vec<Candidate>> {
        let outcomes = self.fetch_all(feeds).await;

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        let candidates: Vec<Candidate> = outcomes
            .into_iter()
            .flat_map(|o| o.candidates)
            .collect();

        if candidates.is_empty() {
            return Err(Error::Sourcing(format!(
                "No candidates from any feed ({} of {} feeds failed)",
                failed,
                feeds.len()
            )));
        }

        Ok(candidates)
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }
}

/// Parse candidates from raw feed text.
///
/// Splits on line breaks (`str::lines` absorbs both `\n` and `\r\n`),
/// drops empty lines and comments, and parses each token as `host:port`.
/// When line parsing yields nothing, falls back to regex IP:PORT
/// extraction for feeds that wrap their list in HTML.
pub fn parse_candidates(content: &str) -> Vec<Candidate> {
    let candidates: Vec<Candidate> = content.lines().filter_map(Candidate::parse).collect();

    if candidates.is_empty() {
        return extract_with_regex(content);
    }

    candidates
}

/// Extract candidates using regex pattern matching
fn extract_with_regex(content: &str) -> Vec<Candidate> {
    IP_PORT_REGEX
        .captures_iter(content)
        .filter_map(|cap| {
            let host = cap.get(1)?.as_str();
            let port: u16 = cap.get(2)?.as_str().parse().ok()?;

            // Each octet must be a valid byte
            for part in host.split('.') {
                let num: u32 = part.parse().ok()?;
                if num > 255 {
                    return None;
                }
            }

            if port == 0 {
                return None;
            }

            Some(Candidate::new(host.to_string(), port))
        })
        .collect()
}
