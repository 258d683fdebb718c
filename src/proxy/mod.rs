//! Proxy acquisition and liveness validation

pub mod engine;
pub mod feed;
pub mod models;
pub mod pool;
pub mod prober;

pub use engine::{EngineConfig, ValidationEngine};
pub use feed::{parse_candidates, FeedConfig, FeedReader};
pub use models::{Candidate, FeedOutcome, ProbeOutcome};
pub use pool::build_pool;
pub use prober::{HttpProber, Probe, ProberConfig};
