//! Latency collection and reporting for pibench
//!
//! - Per-agent sample collection and summary statistics
//! - Aggregate rollup across all agents of a run
//! - Report assembly and output formatting

pub mod aggregate;
pub mod collector;
pub mod reporting;

// Re-export public types for easier access
pub use aggregate::AggregateMetrics;
pub use collector::{LatencyStats, StatsCollector, Summary};
pub use reporting::BenchReport;
