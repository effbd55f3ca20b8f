//! Command-line argument parsing for pibench configuration

use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use super::{AgentConfig, BenchmarkConfig, Config, OutputConfig, TargetConfig};
use crate::constants::*;
use crate::errors::{BenchError, ErrorContext, Result};
use crate::workload::{MultiDbSetBits, RandomSetBits};

/// Raw configuration from command line arguments
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pibench",
    version,
    about = "Runs concurrent write benchmarks against a Pilosa-style bitmap index",
    long_about = None
)]
pub struct RawConfig {
    /// Service hosts forming the client pool
    #[arg(
        short = 'H',
        long = "host",
        value_name = "URL",
        action = clap::ArgAction::Append,
        global = true,
        help = "Service host (repeat for a pool; default http://localhost:10101)"
    )]
    pub hosts: Vec<String>,

    /// Number of concurrent agents
    #[arg(
        short = 'a',
        long = "agents",
        value_name = "COUNT",
        default_value = "1",
        global = true,
        help = "Number of concurrent agents to run"
    )]
    pub agents: u32,

    /// Client distribution strategy
    #[arg(
        long = "client-type",
        value_name = "STRATEGY",
        default_value = DEFAULT_CLIENT_TYPE,
        global = true,
        help = "Can be 'single' (all agents hitting one host) or 'round_robin'"
    )]
    pub client_type: String,

    /// Serialize calls through the shared client
    #[arg(
        long = "serialize-shared",
        global = true,
        help = "With 'single', let only one agent query the shared client at a time"
    )]
    pub serialize_shared: bool,

    /// Per-request timeout in seconds
    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECONDS,
        global = true,
        help = "Per-request timeout in seconds"
    )]
    pub timeout: u64,

    /// Overall run deadline
    #[arg(
        long = "run-timeout",
        value_name = "DURATION",
        global = true,
        help = "Cancel the run after this long (e.g., '30s', '5m', '2h')"
    )]
    pub run_timeout: Option<String>,

    /// Allow insecure connections
    #[arg(
        long = "insecure",
        global = true,
        help = "Allow insecure TLS connections (skip certificate verification)"
    )]
    pub insecure: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose", global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Emit the report as JSON
    #[arg(long = "json", global = true, help = "Print the report as JSON")]
    pub json: bool,

    #[command(subcommand)]
    pub benchmark: BenchmarkCommand,
}

/// Benchmark to run
#[derive(Subcommand, Debug, Clone)]
pub enum BenchmarkCommand {
    /// Sets bits with increasing profile id and bitmap id using a different DB for each agent
    #[command(name = "multi-db-set-bits")]
    MultiDbSetBits(MultiDbSetBitsArgs),

    /// Sets bits at random coordinates within the given id ranges
    #[command(name = "random-set-bits")]
    RandomSetBits(RandomSetBitsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MultiDbSetBitsArgs {
    /// Bits being set will all be greater than base-bitmap-id
    #[arg(long = "base-bitmap-id", default_value_t = 0, allow_negative_numbers = true)]
    pub base_bitmap_id: i64,

    /// Profile id num to start from
    #[arg(long = "base-profile-id", default_value_t = 0, allow_negative_numbers = true)]
    pub base_profile_id: i64,

    /// Number of bits to set
    #[arg(long = "iterations", default_value_t = DEFAULT_ITERATIONS, allow_negative_numbers = true)]
    pub iterations: i64,
}

#[derive(Args, Debug, Clone)]
pub struct RandomSetBitsArgs {
    /// Lowest bitmap id to set
    #[arg(long = "base-bitmap-id", default_value_t = 0, allow_negative_numbers = true)]
    pub base_bitmap_id: i64,

    /// Number of distinct bitmap ids above the base
    #[arg(long = "bitmap-id-range", default_value_t = DEFAULT_ID_RANGE, allow_negative_numbers = true)]
    pub bitmap_id_range: i64,

    /// Lowest profile id to set
    #[arg(long = "base-profile-id", default_value_t = 0, allow_negative_numbers = true)]
    pub base_profile_id: i64,

    /// Number of distinct profile ids above the base
    #[arg(long = "profile-id-range", default_value_t = DEFAULT_ID_RANGE, allow_negative_numbers = true)]
    pub profile_id_range: i64,

    /// Number of bits to set per agent
    #[arg(long = "iterations", default_value_t = DEFAULT_ITERATIONS, allow_negative_numbers = true)]
    pub iterations: i64,

    /// Random seed; agent N uses seed + N
    #[arg(long = "seed", default_value_t = 1)]
    pub seed: u64,

    /// Database to write into
    #[arg(long = "db", default_value = DEFAULT_RANDOM_DB)]
    pub db: String,
}

impl RawConfig {
    /// Parse from command line arguments
    pub fn parse_from_args() -> Result<Self> {
        Ok(Self::parse())
    }

    /// Parse from an explicit argument list without exiting on error
    pub fn try_parse_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args).with_config_context("Invalid arguments")
    }

    /// Parse duration string with time suffixes (s/m/h)
    fn parse_duration(duration_str: &str) -> Result<Duration> {
        let duration_str = duration_str.trim();

        let Some(last_char) = duration_str.chars().last() else {
            return Err(BenchError::config("Duration cannot be empty"));
        };

        let (number_part, multiplier) = match last_char {
            's' | 'S' => (&duration_str[..duration_str.len() - 1], 1),
            'm' | 'M' => (&duration_str[..duration_str.len() - 1], 60),
            'h' | 'H' => (&duration_str[..duration_str.len() - 1], 3600),
            // No suffix, assume seconds
            _ => (duration_str, 1),
        };

        let value = number_part.parse::<u64>().map_err(|_| {
            BenchError::config(format!(
                "Invalid duration format: '{}' - expected a number with optional s/m/h suffix",
                duration_str
            ))
        })?;
        let seconds = value.checked_mul(multiplier).ok_or_else(|| {
            BenchError::config(format!("Duration '{}' is too large", duration_str))
        })?;
        Ok(Duration::from_secs(seconds))
    }
}

impl From<MultiDbSetBitsArgs> for MultiDbSetBits {
    fn from(args: MultiDbSetBitsArgs) -> Self {
        MultiDbSetBits::new(args.base_bitmap_id, args.base_profile_id, args.iterations)
    }
}

impl From<RandomSetBitsArgs> for RandomSetBits {
    fn from(args: RandomSetBitsArgs) -> Self {
        RandomSetBits {
            base_bitmap_id: args.base_bitmap_id,
            bitmap_id_range: args.bitmap_id_range,
            base_profile_id: args.base_profile_id,
            profile_id_range: args.profile_id_range,
            iterations: args.iterations,
            seed: args.seed,
            db: args.db,
        }
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = BenchError;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let client_type = raw.client_type.parse()?;

        let run_timeout = match &raw.run_timeout {
            Some(duration_str) => Some(RawConfig::parse_duration(duration_str)?),
            None => None,
        };

        let hosts = if raw.hosts.is_empty() {
            vec![DEFAULT_HOST.to_string()]
        } else {
            raw.hosts
        };

        let benchmark = match raw.benchmark {
            BenchmarkCommand::MultiDbSetBits(args) => BenchmarkConfig::MultiDbSetBits(args.into()),
            BenchmarkCommand::RandomSetBits(args) => BenchmarkConfig::RandomSetBits(args.into()),
        };

        Ok(Config {
            target: TargetConfig {
                hosts,
                request_timeout: Duration::from_secs(raw.timeout),
                insecure: raw.insecure,
            },
            agents: AgentConfig {
                count: raw.agents,
                client_type,
                serialize_shared: raw.serialize_shared,
                run_timeout,
            },
            output: OutputConfig {
                verbose: raw.verbose,
                json: raw.json,
            },
            benchmark,
        })
    }
}
