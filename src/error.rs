//! Error types for the proxy harvesting pipeline

/// Fatal error kinds that cross back to the HTTP layer.
///
/// Per-feed and per-probe failures never appear here; they are absorbed
/// where they occur (a failed feed contributes zero candidates, a failed
/// probe becomes a `Dead` classification).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid API key
    #[error("Authentication failed: API key is missing or invalid")]
    Unauthorized,
    /// Every feed failed or produced no parsable candidates
    #[error("Sourcing failed: {0}")]
    Sourcing(String),
    /// Pool was non-empty but no candidate was reachable within budget
    #[error("Validation failed: {0}")]
    Validation(String),
    /// Artifact upload failed or returned an unusable response
    #[error("Publish failed: {0}")]
    Publish(String),
    /// Invalid process configuration
    #[error("Configuration error: {0}")]
    Config(String),
    /// HTTP client error outside the absorbed per-feed/per-probe paths
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
