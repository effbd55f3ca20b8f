//! Per-agent benchmark results

use crate::common::AgentId;
use crate::errors::BenchError;
use crate::metrics::Summary;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Outcome of one agent's execution
///
/// Serializes either as the flattened summary fields or as `{"error": "..."}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AgentResult {
    Success(Summary),
    Failed {
        #[serde(serialize_with = "error_description")]
        error: BenchError,
    },
}

/// One entry per requested agent index, ordered by index
pub type AgentResults = BTreeMap<AgentId, AgentResult>;

impl AgentResult {
    pub fn failed(error: BenchError) -> Self {
        AgentResult::Failed { error }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AgentResult::Success(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AgentResult::Failed { error } if error.is_cancelled())
    }

    pub fn summary(&self) -> Option<&Summary> {
        match self {
            AgentResult::Success(summary) => Some(summary),
            AgentResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&BenchError> {
        match self {
            AgentResult::Success(_) => None,
            AgentResult::Failed { error } => Some(error),
        }
    }
}

impl From<Summary> for AgentResult {
    fn from(summary: Summary) -> Self {
        AgentResult::Success(summary)
    }
}

fn error_description<S: Serializer>(
    error: &BenchError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
