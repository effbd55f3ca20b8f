//! Application-wide constants and configuration values

use std::time::Duration;

// Agent limits
pub const MAX_AGENTS_LIMIT: u32 = 10_000;

// Client defaults
pub const DEFAULT_HOST: &str = "http://localhost:10101";
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_CLIENT_TYPE: &str = "single";

// Workload defaults
pub const DEFAULT_ITERATIONS: i64 = 100;
pub const MULTI_DB_NAMESPACE_PREFIX: &str = "multidb";
pub const SET_BIT_FRAME: &str = "frame.n";
pub const DEFAULT_RANDOM_DB: &str = "benchdb";
pub const DEFAULT_ID_RANGE: i64 = 1_000;

// Grace period for agents to notice cancellation after a deadline fires
pub const CANCEL_GRACE_PERIOD: Duration = Duration::from_secs(5);

// Logging
pub const DEBUG_LOG_INTERVAL: u64 = 100;
