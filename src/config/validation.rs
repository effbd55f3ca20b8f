//! Configuration validation logic
//!
//! Iteration counts and base ids are deliberately left unchecked: negative
//! values simply produce no iterations or negative coordinates.

use super::{BenchmarkConfig, Config};
use crate::client::HttpServiceClient;
use crate::constants::MAX_AGENTS_LIMIT;
use crate::errors::{BenchError, Result};
use url::Url;

/// Validate the configuration
pub fn validate(config: &Config) -> Result<()> {
    validate_hosts(config)?;
    validate_agent_config(config)?;
    validate_target_config(config)?;
    validate_benchmark(config)?;
    Ok(())
}

/// Validate every host in the client pool
fn validate_hosts(config: &Config) -> Result<()> {
    if config.target.hosts.is_empty() {
        return Err(BenchError::config("At least one host is required"));
    }

    for host in &config.target.hosts {
        let normalized = HttpServiceClient::normalize_host(host);
        let url = Url::parse(&normalized)
            .map_err(|e| BenchError::config(format!("Invalid host '{}': {}", host, e)))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(BenchError::config(format!(
                    "Invalid URL scheme '{}' for host '{}'. Only 'http' and 'https' are supported",
                    scheme, host
                )));
            }
        }
    }

    Ok(())
}

/// Validate agent configuration
fn validate_agent_config(config: &Config) -> Result<()> {
    if config.agents.count == 0 {
        return Err(BenchError::config("Number of agents must be greater than 0"));
    }

    if config.agents.count > MAX_AGENTS_LIMIT {
        return Err(BenchError::config(format!(
            "Number of agents cannot exceed {}",
            MAX_AGENTS_LIMIT
        )));
    }

    if let Some(run_timeout) = config.agents.run_timeout
        && run_timeout.is_zero()
    {
        return Err(BenchError::config("Run timeout must be greater than 0"));
    }

    Ok(())
}

/// Validate transport configuration
fn validate_target_config(config: &Config) -> Result<()> {
    if config.target.request_timeout.is_zero() {
        return Err(BenchError::config("Timeout must be greater than 0"));
    }
    Ok(())
}

/// Validate benchmark-specific parameters
fn validate_benchmark(config: &Config) -> Result<()> {
    match &config.benchmark {
        BenchmarkConfig::MultiDbSetBits(_) => Ok(()),
        BenchmarkConfig::RandomSetBits(workload) => {
            if workload.bitmap_id_range <= 0 || workload.profile_id_range <= 0 {
                return Err(BenchError::config(
                    "Bitmap and profile id ranges must be greater than 0",
                ));
            }
            if workload.db.trim().is_empty() {
                return Err(BenchError::config("Database name cannot be empty"));
            }
            Ok(())
        }
    }
}
