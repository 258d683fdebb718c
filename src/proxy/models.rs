//! Pipeline data models

use serde::{Deserialize, Serialize};
use std::fmt;

/// An unvalidated proxy endpoint obtained from a feed.
///
/// Candidates are value types: two candidates with the same host and port
/// are the same candidate, which is what pool deduplication relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub host: String,
    pub port: u16,
}

impl Candidate {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }

    /// Parse a raw `host:port` token.
    ///
    /// Returns `None` for empty lines, comments, missing ports, and ports
    /// that do not parse as a positive integer. Malformed tokens are
    /// dropped here rather than carried forward to fail at probe time.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() || token.starts_with('#') {
            return None;
        }

        let (host, port) = token.rsplit_once(':')?;
        if host.is_empty() {
            return None;
        }
        let port: u16 = port.parse().ok()?;
        if port == 0 {
            return None;
        }

        Some(Self::new(host.to_string(), port))
    }

    /// Proxy URL for routing a request through this candidate
    pub fn proxy_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Binary reachability classification of a single candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Live(Candidate),
    Dead(Candidate, String),
}

impl ProbeOutcome {
    pub fn is_live(&self) -> bool {
        matches!(self, ProbeOutcome::Live(_))
    }

    pub fn candidate(&self) -> &Candidate {
        match self {
            ProbeOutcome::Live(c) => c,
            ProbeOutcome::Dead(c, _) => c,
        }
    }
}

/// Outcome of querying one upstream feed.
///
/// Feeds are independent; a failure here is diagnostic only and never
/// invalidates another feed's candidates.
#[derive(Debug, Clone)]
pub struct FeedOutcome {
    /// The feed URL that was queried
    pub feed: String,
    /// Candidates parsed from the feed body
    pub candidates: Vec<Candidate>,
    /// Failure reason when the fetch or parse produced nothing
    pub error: Option<String>,
}

impl FeedOutcome {
    pub fn success(feed: String, candidates: Vec<Candidate>) -> Self {
        Self {
            feed,
            candidates,
            error: None,
        }
    }

    pub fn failure(feed: String, error: String) -> Self {
        Self {
            feed,
            candidates: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
