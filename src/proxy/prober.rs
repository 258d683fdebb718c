//! Liveness probing of proxy candidates

use crate::proxy::models::{Candidate, ProbeOutcome};
use async_trait::async_trait;
use reqwest::{Client, Proxy as ReqwestProxy};
use std::time::Duration;

/// Default per-probe timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default URL to test candidates against
const DEFAULT_TARGET: &str = "https://httpbin.org/ip";

/// Liveness oracle for a single candidate.
///
/// Implementations must absorb every failure mode into a `Dead`
/// classification; a bad candidate never aborts the batch.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, candidate: Candidate) -> ProbeOutcome;
}

/// Configuration for the HTTP prober
#[derive(Debug, Clone)]
pub struct ProberConfig {
    /// Timeout for each probe
    pub timeout: Duration,
    /// URL requested through the candidate to decide liveness
    pub target: String,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            target: DEFAULT_TARGET.to_string(),
        }
    }
}

impl ProberConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_target(mut self, target: String) -> Self {
        self.target = target;
        self
    }
}

/// Probes a candidate by routing a GET to the validation target through
/// it as an HTTP forward proxy. The response body is never inspected;
/// any completed successful response means the candidate is live.
pub struct HttpProber {
    config: ProberConfig,
}

impl HttpProber {
    pub fn new() -> Self {
        Self::with_config(ProberConfig::default())
    }

    pub fn with_config(config: ProberConfig) -> Self {
        Self { config }
    }

    /// Create a reqwest client routed through the candidate
    fn create_client(&self, candidate: &Candidate) -> reqwest::Result<Client> {
        let proxy = ReqwestProxy::http(candidate.proxy_url())?;
        Client::builder()
            .proxy(proxy)
            .timeout(self.config.timeout)
            .build()
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, candidate: Candidate) -> ProbeOutcome {
        let client = match self.create_client(&candidate) {
            Ok(client) => client,
            Err(e) => return ProbeOutcome::Dead(candidate, e.to_string()),
        };

        match tokio::time::timeout(
            self.config.timeout,
            client.get(&self.config.target).send(),
        )
        .await
        {
            Ok(Ok(response)) => {
                if response.status().is_success() {
                    ProbeOutcome::Live(candidate)
                } else {
                    let reason = format!("HTTP status: {}", response.status());
                    ProbeOutcome::Dead(candidate, reason)
                }
            }
            Ok(Err(e)) => ProbeOutcome::Dead(candidate, e.to_string()),
            Err(_) => ProbeOutcome::Dead(candidate, "probe timed out".to_string()),
        }
    }
}
