//! Domain-specific error types for the pibench harness
//!
//! Setup errors (`UnknownStrategy`, `NoClientsAvailable`, `Config`) abort a run
//! before any agent starts. Per-agent errors (`MissingClient`,
//! `QueryExecution`, `Cancelled`, `Aborted`) only ever appear inside that
//! agent's result.

use crate::common::AgentId;
use thiserror::Error;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum BenchError {
    /// A latency sample with a negative duration
    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    /// Unrecognized client distribution strategy
    #[error("Unknown client distribution strategy '{0}' (expected 'single' or 'round_robin')")]
    UnknownStrategy(String),

    /// The client pool has no slots at all
    #[error("No clients available: the client pool is empty")]
    NoClientsAvailable,

    /// The agent was not assigned a client
    #[error("No client set for agent {agent}")]
    MissingClient { agent: AgentId },

    /// A query failed part way through an agent's run
    #[error("Agent {agent} failed on iteration {iteration}: {source}")]
    QueryExecution {
        agent: AgentId,
        iteration: i64,
        #[source]
        source: Box<BenchError>,
    },

    /// The shared run context was cancelled before the agent finished
    #[error("Agent {agent} cancelled after {completed} iterations")]
    Cancelled { agent: AgentId, completed: u64 },

    /// The agent ignored cancellation and was stopped after the grace period
    #[error("Agent {agent} aborted: did not stop after cancellation")]
    Aborted { agent: AgentId },

    /// Configuration-related errors (CLI parsing, validation, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered but reported a query error
    #[error("Server error: {0}")]
    Server(String),

    /// Benchmark execution errors (task failures, etc.)
    #[error("Execution error: {0}")]
    Execution(String),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

/// Result type using BenchError
pub type Result<T> = std::result::Result<T, BenchError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    fn with_config_context(self, msg: &str) -> Result<T>;
    fn with_transport_context(self, msg: &str) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn with_config_context(self, msg: &str) -> Result<T> {
        self.map_err(|e| BenchError::Config(format!("{}: {}", msg, e)))
    }

    fn with_transport_context(self, msg: &str) -> Result<T> {
        self.map_err(|e| BenchError::Transport(format!("{}: {}", msg, e)))
    }
}

impl<T> ErrorContext<T> for Option<T> {
    fn with_config_context(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| BenchError::Config(msg.to_string()))
    }

    fn with_transport_context(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| BenchError::Transport(msg.to_string()))
    }
}

// Convenience constructors
impl BenchError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        BenchError::Config(msg.into())
    }

    pub fn execution<S: Into<String>>(msg: S) -> Self {
        BenchError::Execution(msg.into())
    }

    /// Whether this error came from the shared context being cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            BenchError::Cancelled { .. } | BenchError::Aborted { .. }
        )
    }

    /// The agent this error belongs to, if it is a per-agent error
    pub fn agent(&self) -> Option<AgentId> {
        match self {
            BenchError::MissingClient { agent }
            | BenchError::QueryExecution { agent, .. }
            | BenchError::Cancelled { agent, .. }
            | BenchError::Aborted { agent } => Some(*agent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_client_names_agent() {
        let err = BenchError::MissingClient {
            agent: AgentId::new(7),
        };
        assert_eq!(err.to_string(), "No client set for agent 7");
        assert_eq!(err.agent(), Some(AgentId::new(7)));
    }

    #[test]
    fn test_query_execution_wraps_source() {
        let err = BenchError::QueryExecution {
            agent: AgentId::new(2),
            iteration: 4,
            source: Box::new(BenchError::Server("frame not found".to_string())),
        };
        let msg = err.to_string();
        assert!(msg.contains("Agent 2"));
        assert!(msg.contains("iteration 4"));
        assert!(msg.contains("frame not found"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_aborted_counts_as_cancelled() {
        let err = BenchError::Aborted {
            agent: AgentId::new(3),
        };
        assert!(err.is_cancelled());
        assert_eq!(err.agent(), Some(AgentId::new(3)));
        assert!(!BenchError::execution("task failed").is_cancelled());
    }

    #[test]
    fn test_option_context() {
        let missing: Option<u32> = None;
        let err = missing.with_config_context("no hosts").unwrap_err();
        assert!(matches!(err, BenchError::Config(ref m) if m == "no hosts"));
    }
}
