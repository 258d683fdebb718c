//! Proxy Harvest - live proxy acquisition and validation API
//!
//! Fetches proxy candidates from public feeds, validates reachability
//! under a concurrency and time budget, publishes the surviving set as a
//! text artifact, and serves the whole pipeline behind one authenticated
//! HTTP endpoint.

pub mod config;
pub mod error;
pub mod proxy;
pub mod publish;
pub mod server;

pub use config::{AppConfig, Strategy};
pub use error::{Error, Result};
pub use proxy::*;
