//! Process configuration
//!
//! All tunables live in one immutable struct built at startup and passed
//! by reference into the pipeline. Nothing reads the environment after
//! construction.

use crate::error::{Error, Result};
use std::env;
use std::time::Duration;

/// Default feed timeout in seconds
const DEFAULT_FEED_TIMEOUT_SECS: u64 = 10;

/// Default per-probe timeout in seconds
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Default number of concurrent probes
const DEFAULT_PROBE_CONCURRENCY: usize = 50;

/// Default and maximum result set size
const DEFAULT_COUNT: usize = 1000;

/// Default probe ceiling as a multiple of the requested count
const DEFAULT_CANDIDATE_MULTIPLIER: usize = 4;

/// Default URL to test proxies against
const DEFAULT_VALIDATION_TARGET: &str = "https://httpbin.org/ip";

/// Default artifact host API endpoint
const DEFAULT_CATBOX_API_URL: &str = "https://catbox.moe/user/api.php";

/// Default upstream proxy list feeds, one `host:port` per line
const DEFAULT_FEEDS: &[&str] = &[
    "https://api.proxyscrape.com/v2/?request=getproxies&protocol=http&timeout=10000&country=all&ssl=all&anonymity_level=elite_proxy,anonymous",
    "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/http.txt",
    "https://www.proxy-list.download/api/v1/get?type=http",
];

/// Validation strategy for the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Probe the whole ceiling prefix, await everything, stable-filter
    Bulk,
    /// Bounded-concurrency probing with early stop at the Nth live hit
    #[default]
    Streaming,
}

impl Strategy {
    fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bulk" => Ok(Strategy::Bulk),
            "streaming" => Ok(Strategy::Streaming),
            other => Err(Error::Config(format!(
                "Invalid strategy: {}. Use: bulk, streaming",
                other
            ))),
        }
    }
}

/// Immutable application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Admin API key; requests are rejected when unset
    pub admin_key: Option<String>,
    /// Catbox account hash attached to uploads (empty = anonymous)
    pub catbox_userhash: String,
    /// Artifact host API endpoint
    pub catbox_api_url: String,
    /// Upstream feed URLs
    pub feeds: Vec<String>,
    /// Timeout for each feed fetch
    pub feed_timeout: Duration,
    /// Timeout for each liveness probe
    pub probe_timeout: Duration,
    /// Number of concurrent probes
    pub probe_concurrency: usize,
    /// URL reached through each candidate to decide liveness
    pub validation_target: String,
    /// Result set size used when the caller omits `count`
    pub default_count: usize,
    /// Hard ceiling on the requested result set size
    pub max_count: usize,
    /// At most `candidate_multiplier * count` candidates are probed
    pub candidate_multiplier: usize,
    /// Shuffle the pool before probing
    pub shuffle: bool,
    /// Validation strategy
    pub strategy: Strategy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_key: None,
            catbox_userhash: String::new(),
            catbox_api_url: DEFAULT_CATBOX_API_URL.to_string(),
            feeds: DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect(),
            feed_timeout: Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
            validation_target: DEFAULT_VALIDATION_TARGET.to_string(),
            default_count: DEFAULT_COUNT,
            max_count: DEFAULT_COUNT,
            candidate_multiplier: DEFAULT_CANDIDATE_MULTIPLIER,
            shuffle: true,
            strategy: Strategy::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the configuration from environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        config.admin_key = env::var("ADMIN_API_KEY").ok().filter(|k| !k.is_empty());

        if let Ok(userhash) = env::var("CATBOX_USERHASH") {
            config.catbox_userhash = userhash;
        }
        if let Ok(url) = env::var("CATBOX_API_URL") {
            config.catbox_api_url = url;
        }
        if let Ok(feeds) = env::var("PROXY_FEEDS") {
            let feeds: Vec<String> = feeds
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if feeds.is_empty() {
                return Err(Error::Config("PROXY_FEEDS is set but empty".to_string()));
            }
            config.feeds = feeds;
        }
        if let Ok(target) = env::var("VALIDATION_TARGET") {
            config.validation_target = target;
        }
        if let Some(secs) = parse_env_var("FEED_TIMEOUT_SECS")? {
            config.feed_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_env_var("PROBE_TIMEOUT_SECS")? {
            config.probe_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse_env_var("PROBE_CONCURRENCY")? {
            config.probe_concurrency = n;
        }
        if let Some(n) = parse_env_var("DEFAULT_COUNT")? {
            config.default_count = n;
        }
        if let Some(n) = parse_env_var("MAX_COUNT")? {
            config.max_count = n;
        }
        if let Some(n) = parse_env_var("CANDIDATE_MULTIPLIER")? {
            config.candidate_multiplier = n;
        }
        if let Ok(v) = env::var("SHUFFLE_POOL") {
            config.shuffle = matches!(v.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = env::var("VALIDATION_STRATEGY") {
            config.strategy = Strategy::parse(&v)?;
        }

        Ok(config)
    }

    pub fn with_admin_key(mut self, key: &str) -> Self {
        self.admin_key = Some(key.to_string());
        self
    }

    pub fn with_feeds(mut self, feeds: Vec<String>) -> Self {
        self.feeds = feeds;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Clamp a requested count to the configured maximum, substituting
    /// the default when the caller supplied nothing usable (zero counts
    /// as unset).
    pub fn clamp_count(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|&n| n > 0)
            .unwrap_or(self.default_count)
            .min(self.max_count)
    }
}

fn parse_env_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("Invalid value for {}: {}", name, v))),
        Err(_) => Ok(None),
    }
}
