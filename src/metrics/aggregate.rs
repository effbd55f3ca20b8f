//! Aggregate statistics across all agents of a run

use crate::metrics::collector::as_millis;
use crate::result::{AgentResult, AgentResults};

use serde::Serialize;
use std::time::Duration;

/// Cross-agent rollup of per-agent summaries
///
/// Percentiles cannot be merged from summaries, so only count, extremes and
/// a count-weighted mean are reported.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AggregateMetrics {
    pub agents: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub total_queries: usize,
    #[serde(serialize_with = "optional_millis")]
    pub min: Option<Duration>,
    #[serde(serialize_with = "optional_millis")]
    pub max: Option<Duration>,
    #[serde(serialize_with = "optional_millis")]
    pub mean: Option<Duration>,
}

impl AggregateMetrics {
    pub fn from_results(results: &AgentResults) -> Self {
        let mut aggregate = Self {
            agents: results.len(),
            ..Default::default()
        };
        let mut total_time = Duration::ZERO;

        for result in results.values() {
            match result {
                AgentResult::Success(summary) => {
                    aggregate.succeeded += 1;
                    aggregate.total_queries += summary.count;

                    if let Some(latency) = &summary.latency {
                        total_time += latency.total;
                        aggregate.min = Some(match aggregate.min {
                            Some(min) => min.min(latency.min),
                            None => latency.min,
                        });
                        aggregate.max = Some(match aggregate.max {
                            Some(max) => max.max(latency.max),
                            None => latency.max,
                        });
                    }
                }
                AgentResult::Failed { error } => {
                    if error.is_cancelled() {
                        aggregate.cancelled += 1;
                    } else {
                        aggregate.failed += 1;
                    }
                }
            }
        }

        if aggregate.total_queries > 0 {
            let mean_nanos = total_time.as_nanos() / aggregate.total_queries as u128;
            aggregate.mean = Some(Duration::from_nanos(
                u64::try_from(mean_nanos).unwrap_or(u64::MAX),
            ));
        }

        aggregate
    }

    /// Every agent completed successfully
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.agents
    }

    /// Success rate across agents (0.0 to 100.0)
    pub fn success_rate(&self) -> f64 {
        if self.agents == 0 {
            return 100.0;
        }
        (self.succeeded as f64 / self.agents as f64) * 100.0
    }
}

fn optional_millis<S: serde::Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match duration {
        Some(duration) => as_millis(duration, serializer),
        None => serializer.serialize_none(),
    }
}
