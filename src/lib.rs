//! pibench: concurrent write benchmarks for Pilosa-style bitmap index services
//!
//! A run drives `N` agents at once. Each agent gets a client from the
//! [`client::ClientProvisioner`], runs a [`workload::BenchmarkWorkload`] and
//! reports an [`result::AgentResult`]; the [`runner::BenchmarkRunner`]
//! guarantees exactly one result per agent index.

pub mod client;
pub mod common;
pub mod config;
pub mod constants;
pub mod errors;
pub mod metrics;
pub mod result;
pub mod runner;
pub mod workload;

pub use client::{ClientProvisioner, DistributionStrategy, ServiceClient};
pub use common::{AgentId, CancelHandle, RunContext};
pub use errors::{BenchError, Result};
pub use metrics::{StatsCollector, Summary};
pub use result::{AgentResult, AgentResults};
pub use runner::BenchmarkRunner;
pub use workload::{BenchmarkWorkload, WorkloadFactory};
