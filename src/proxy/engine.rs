//! Validation engine: turns a candidate pool into a bounded live set
//!
//! Probing runs under three joint budgets: the requested count, a
//! candidate ceiling (a configured multiple of the count), and the fixed
//! fan-out width. Two strategies are supported: `Bulk` probes the whole
//! ceiling prefix and stable-filters, `Streaming` stops as soon as enough
//! live candidates have been confirmed.

use crate::config::Strategy;
use crate::error::{Error, Result};
use crate::proxy::models::{Candidate, ProbeOutcome};
use crate::proxy::prober::Probe;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::info;

/// Default number of concurrent probes
const DEFAULT_CONCURRENCY: usize = 50;

/// Default probe ceiling as a multiple of the requested count
const DEFAULT_MULTIPLIER: usize = 4;

/// Configuration for the validation engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of concurrent probes
    pub concurrency: usize,
    /// At most `candidate_multiplier * count` candidates are probed
    pub candidate_multiplier: usize,
    /// Validation strategy
    pub strategy: Strategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            candidate_multiplier: DEFAULT_MULTIPLIER,
            strategy: Strategy::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_multiplier(mut self, multiplier: usize) -> Self {
        self.candidate_multiplier = multiplier;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Validation engine driving the liveness prober over a candidate pool
pub struct ValidationEngine {
    config: EngineConfig,
    prober: Arc<dyn Probe>,
}

impl ValidationEngine {
    pub fn new(prober: Arc<dyn Probe>) -> Self {
        Self::with_config(EngineConfig::default(), prober)
    }

    pub fn with_config(config: EngineConfig, prober: Arc<dyn Probe>) -> Self {
        Self { config, prober }
    }

    /// Validate the pool and return at most `count` live candidates.
    ///
    /// Result length is `min(count, live found within budget)`. An empty
    /// pool is a sourcing failure; a non-empty pool with zero live
    /// candidates is a validation failure, reported distinctly.
    pub async fn validate(&self, pool: Vec<Candidate>, count: usize) -> Result<Vec<Candidate>> {
        if pool.is_empty() {
            return Err(Error::Sourcing("Candidate pool is empty".to_string()));
        }

        let pool_size = pool.len();
        let ceiling = self
            .config
            .candidate_multiplier
            .saturating_mul(count)
            .min(pool_size)
            .max(1);
        let concurrency = self.config.concurrency.max(1);

        let (live, probed) = match self.config.strategy {
            Strategy::Bulk => self.validate_bulk(pool, count, ceiling, concurrency).await,
            Strategy::Streaming => {
                self.validate_streaming(pool, count, ceiling, concurrency)
                    .await
            }
        };

        info!(
            pool = pool_size,
            probed,
            live = live.len(),
            requested = count,
            "validation finished"
        );

        if live.is_empty() {
            return Err(Error::Validation(format!(
                "None of the {} probed candidates were reachable",
                probed
            )));
        }

        Ok(live)
    }

    /// Probe the whole ceiling prefix, await everything, then filter.
    ///
    /// `buffered` keeps outcomes in pool order, so the filtered result is
    /// a stable prefix of the pool. Total latency is bounded by the
    /// slowest probe, but work is wasted when the count is reached early.
    async fn validate_bulk(
        &self,
        pool: Vec<Candidate>,
        count: usize,
        ceiling: usize,
        concurrency: usize,
    ) -> (Vec<Candidate>, usize) {
        let outcomes: Vec<ProbeOutcome> = stream::iter(pool.into_iter().take(ceiling))
            .map(|candidate| {
                let prober = Arc::clone(&self.prober);
                async move { prober.probe(candidate).await }
            })
            .buffered(concurrency)
            .collect()
            .await;

        let probed = outcomes.len();
        let live = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                ProbeOutcome::Live(c) => Some(c),
                ProbeOutcome::Dead(_, _) => None,
            })
            .take(count)
            .collect();

        (live, probed)
    }

    /// Probe with bounded concurrency and stop at the `count`-th live hit.
    ///
    /// The stream is lazy: once we stop consuming it, unstarted probes
    /// never run and in-flight ones are dropped with it. Only this loop
    /// appends to the result, so concurrent completions cannot race the
    /// accumulator. Result order is confirmation order.
    async fn validate_streaming(
        &self,
        pool: Vec<Candidate>,
        count: usize,
        ceiling: usize,
        concurrency: usize,
    ) -> (Vec<Candidate>, usize) {
        let mut outcomes = stream::iter(pool.into_iter().take(ceiling))
            .map(|candidate| {
                let prober = Arc::clone(&self.prober);
                async move { prober.probe(candidate).await }
            })
            .buffer_unordered(concurrency);

        let mut live = Vec::with_capacity(count);
        let mut probed = 0;

        while let Some(outcome) = outcomes.next().await {
            probed += 1;
            if let ProbeOutcome::Live(candidate) = outcome {
                live.push(candidate);
                if live.len() >= count {
                    break;
                }
            }
        }

        (live, probed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Prober that classifies by a fixed live set and counts calls
    struct FakeProber {
        live: HashSet<Candidate>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl FakeProber {
        fn new(live: &[Candidate]) -> Self {
            Self {
                live: live.iter().cloned().collect(),
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Probe for FakeProber {
        async fn probe(&self, candidate: Candidate) -> ProbeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.live.contains(&candidate) {
                ProbeOutcome::Live(candidate)
            } else {
                ProbeOutcome::Dead(candidate, "fake dead".to_string())
            }
        }
    }

    fn pool_of(n: usize) -> Vec<Candidate> {
        (1..=n)
            .map(|i| Candidate::new(format!("10.0.0.{}", i), 8080))
            .collect()
    }

    fn engine(strategy: Strategy, prober: Arc<FakeProber>) -> ValidationEngine {
        let config = EngineConfig::new()
            .with_strategy(strategy)
            .with_concurrency(1)
            .with_multiplier(4);
        ValidationEngine::with_config(config, prober)
    }

    #[tokio::test]
    async fn test_empty_pool_is_sourcing_failure() {
        let prober = Arc::new(FakeProber::new(&[]));
        let engine = engine(Strategy::Bulk, prober);
        match engine.validate(Vec::new(), 10).await {
            Err(Error::Sourcing(_)) => {}
            other => panic!("Expected Sourcing error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_live_is_validation_failure() {
        let pool = pool_of(10);
        let prober = Arc::new(FakeProber::new(&[]));
        let engine = engine(Strategy::Bulk, Arc::clone(&prober));
        match engine.validate(pool, 5).await {
            Err(Error::Validation(msg)) => assert!(msg.contains("reachable")),
            other => panic!("Expected Validation error, got {:?}", other),
        }
        assert!(prober.calls() > 0);
    }

    #[tokio::test]
    async fn test_result_length_is_min_of_count_and_live() {
        let pool = pool_of(10);
        let prober = Arc::new(FakeProber::new(&pool));
        let engine = engine(Strategy::Bulk, prober);

        // More live available than requested
        let result = engine.validate(pool_of(10), 3).await.unwrap();
        assert_eq!(result.len(), 3);

        // Fewer live than requested
        let live = &pool[..2];
        let prober = Arc::new(FakeProber::new(live));
        let engine = self::engine(Strategy::Bulk, prober);
        let result = engine.validate(pool_of(10), 5).await.unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_result_has_no_duplicates_and_only_live() {
        let pool = pool_of(20);
        let live = &pool[..8];
        let prober = Arc::new(FakeProber::new(live));
        let engine = engine(Strategy::Streaming, prober);

        let result = engine.validate(pool_of(20), 8).await.unwrap();
        assert_eq!(result.len(), 8);

        let unique: HashSet<_> = result.iter().cloned().collect();
        assert_eq!(unique.len(), result.len());

        let live_set: HashSet<_> = live.iter().cloned().collect();
        for candidate in &result {
            assert!(live_set.contains(candidate));
        }
    }

    #[tokio::test]
    async fn test_streaming_stops_after_nth_live() {
        // First 5 of 20 are live; with sequential probing nothing past
        // the 5th candidate may be touched.
        let pool = pool_of(20);
        let prober = Arc::new(FakeProber::new(&pool[..5]));
        let engine = engine(Strategy::Streaming, Arc::clone(&prober));

        let result = engine.validate(pool, 5).await.unwrap();
        assert_eq!(result.len(), 5);
        assert_eq!(prober.calls(), 5);
    }

    #[tokio::test]
    async fn test_bulk_probes_entire_ceiling_prefix() {
        let pool = pool_of(20);
        let prober = Arc::new(FakeProber::new(&pool[..5]));
        let engine = engine(Strategy::Bulk, Arc::clone(&prober));

        let result = engine.validate(pool, 5).await.unwrap();
        assert_eq!(result.len(), 5);
        assert_eq!(prober.calls(), 20);
    }

    #[tokio::test]
    async fn test_candidate_ceiling_bounds_probes() {
        // multiplier 2, count 2: at most 4 of the 20 candidates probed
        let pool = pool_of(20);
        let prober = Arc::new(FakeProber::new(&pool));
        let config = EngineConfig::new()
            .with_strategy(Strategy::Bulk)
            .with_concurrency(4)
            .with_multiplier(2);
        let engine =
            ValidationEngine::with_config(config, Arc::clone(&prober) as Arc<dyn Probe>);

        let result = engine.validate(pool, 2).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(prober.calls(), 4);
    }

    #[tokio::test]
    async fn test_bulk_result_follows_pool_order() {
        let pool = pool_of(10);
        let prober = Arc::new(FakeProber::new(&pool));
        let config = EngineConfig::new()
            .with_strategy(Strategy::Bulk)
            .with_concurrency(10)
            .with_multiplier(4);
        let engine = ValidationEngine::with_config(config, prober);

        let result = engine.validate(pool.clone(), 10).await.unwrap();
        assert_eq!(result, pool);
    }

    #[tokio::test]
    async fn test_slow_probes_overlap_within_fanout_width() {
        // 20 probes of 50ms each at full width finish in roughly one
        // probe-duration, nowhere near the 1s serial total.
        let pool = pool_of(20);
        let prober =
            Arc::new(FakeProber::new(&pool).with_delay(Duration::from_millis(50)));
        let config = EngineConfig::new()
            .with_strategy(Strategy::Bulk)
            .with_concurrency(20)
            .with_multiplier(4);
        let engine = ValidationEngine::with_config(config, prober);

        let start = std::time::Instant::now();
        let result = engine.validate(pool, 20).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(result.len(), 20);
        assert!(elapsed < Duration::from_millis(500), "took {:?}", elapsed);
    }
}
