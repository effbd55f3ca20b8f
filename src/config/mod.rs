//! Configuration management for pibench
//!
//! This module provides a layered approach to configuration:
//! - Core structures
//! - CLI argument parsing
//! - Configuration validation

pub mod parser;
pub mod validation;

use crate::client::DistributionStrategy;
use crate::errors::Result;
use crate::workload::{BenchmarkWorkload, MultiDbSetBits, RandomSetBits};
use std::sync::Arc;
use std::time::Duration;

/// Service hosts and transport settings
#[derive(Debug, Clone)]
pub struct TargetConfig {
    pub hosts: Vec<String>,
    pub request_timeout: Duration,
    pub insecure: bool,
}

/// Agent count and client distribution
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub count: u32,
    pub client_type: DistributionStrategy,
    pub serialize_shared: bool,
    pub run_timeout: Option<Duration>,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub verbose: bool,
    pub json: bool,
}

/// The benchmark to run and its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum BenchmarkConfig {
    MultiDbSetBits(MultiDbSetBits),
    RandomSetBits(RandomSetBits),
}

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub target: TargetConfig,
    pub agents: AgentConfig,
    pub output: OutputConfig,
    pub benchmark: BenchmarkConfig,
}

impl Config {
    /// Parse and validate configuration from command line arguments
    pub fn from_args() -> Result<Self> {
        let raw_config = parser::RawConfig::parse_from_args()?;
        Self::from_raw(raw_config)
    }

    /// Parse and validate configuration from an explicit argument list
    pub fn try_from_iter<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let raw_config = parser::RawConfig::try_parse_args(args)?;
        Self::from_raw(raw_config)
    }

    fn from_raw(raw_config: parser::RawConfig) -> Result<Self> {
        let config = raw_config.try_into()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Build the workload described by this configuration
    pub fn workload(&self) -> Arc<dyn BenchmarkWorkload> {
        match &self.benchmark {
            BenchmarkConfig::MultiDbSetBits(workload) => Arc::new(*workload),
            BenchmarkConfig::RandomSetBits(workload) => Arc::new(workload.clone()),
        }
    }

    pub fn benchmark_name(&self) -> &'static str {
        match &self.benchmark {
            BenchmarkConfig::MultiDbSetBits(_) => MultiDbSetBits::NAME,
            BenchmarkConfig::RandomSetBits(_) => RandomSetBits::NAME,
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("🧪 pibench Configuration:");
        println!("   Benchmark:        {}", self.benchmark_name());
        println!("   Hosts:            {}", self.target.hosts.join(", "));
        println!("   Agents:           {}", self.agents.count);
        println!("   Client Type:      {}", self.agents.client_type);
        if self.agents.serialize_shared {
            println!("   Shared Client:    serialized");
        }
        println!(
            "   Request Timeout:  {}s",
            self.target.request_timeout.as_secs()
        );
        if let Some(run_timeout) = self.agents.run_timeout {
            println!("   Run Timeout:      {}s", run_timeout.as_secs());
        }

        match &self.benchmark {
            BenchmarkConfig::MultiDbSetBits(workload) => {
                println!("   Base Bitmap ID:   {}", workload.base_bitmap_id);
                println!("   Base Profile ID:  {}", workload.base_profile_id);
                println!("   Iterations:       {}", workload.iterations);
            }
            BenchmarkConfig::RandomSetBits(workload) => {
                println!(
                    "   Bitmap IDs:       {}..{}",
                    workload.base_bitmap_id,
                    workload.base_bitmap_id + workload.bitmap_id_range
                );
                println!(
                    "   Profile IDs:      {}..{}",
                    workload.base_profile_id,
                    workload.base_profile_id + workload.profile_id_range
                );
                println!("   Iterations:       {}", workload.iterations);
                println!("   Seed:             {}", workload.seed);
                println!("   Database:         {}", workload.db);
            }
        }

        if self.target.insecure {
            println!("   Security:         ⚠️  Insecure mode enabled");
        }

        println!();
    }
}
