// src/lib.rs
// Public library surface for the service binary, the probe and integration tests.

pub mod api;
pub mod config;
pub mod metrics;
pub mod trends;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::AggregatorConfig;
pub use crate::trends::{TrendAggregator, TrendBatch, TrendRecord};
