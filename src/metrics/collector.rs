//! Per-agent latency sample collection

use crate::errors::{BenchError, Result};
use serde::{Serialize, Serializer};
use std::time::{Duration, Instant};

/// Append-only latency samples for one agent execution
///
/// Never shared across agents, so no locking.
#[derive(Debug, Clone, Default)]
pub struct StatsCollector {
    samples: Vec<Duration>,
}

/// Latency statistics over a non-empty sample set
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    #[serde(serialize_with = "as_millis")]
    pub min: Duration,
    #[serde(serialize_with = "as_millis")]
    pub max: Duration,
    #[serde(serialize_with = "as_millis")]
    pub mean: Duration,
    #[serde(serialize_with = "as_millis")]
    pub stddev: Duration,
    #[serde(serialize_with = "as_millis")]
    pub total: Duration,
    #[serde(serialize_with = "as_millis")]
    pub p50: Duration,
    #[serde(serialize_with = "as_millis")]
    pub p90: Duration,
    #[serde(serialize_with = "as_millis")]
    pub p99: Duration,
}

/// Summary of a collector; `latency` is `None` when nothing was recorded
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub empty: bool,
    #[serde(flatten)]
    pub latency: Option<LatencyStats>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one elapsed-time sample
    #[inline]
    pub fn add(&mut self, elapsed: Duration) {
        self.samples.push(elapsed);
    }

    /// Record the time between two instants; `end` before `start` is rejected
    pub fn add_between(&mut self, start: Instant, end: Instant) -> Result<()> {
        let elapsed = end.checked_duration_since(start).ok_or_else(|| {
            BenchError::InvalidSample(format!(
                "end precedes start by {:?}",
                start.duration_since(end)
            ))
        })?;
        self.add(elapsed);
        Ok(())
    }

    /// Record a signed nanosecond sample; negative values are rejected
    pub fn add_nanos(&mut self, nanos: i128) -> Result<()> {
        if nanos < 0 {
            return Err(BenchError::InvalidSample(format!(
                "negative duration of {}ns",
                nanos
            )));
        }
        let nanos = u64::try_from(nanos).map_err(|_| {
            BenchError::InvalidSample(format!("duration of {}ns overflows", nanos))
        })?;
        self.add(Duration::from_nanos(nanos));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in recording order
    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    /// Compute summary statistics without touching the recorded samples
    pub fn summarize(&self) -> Summary {
        if self.samples.is_empty() {
            return Summary::empty();
        }

        let mut sorted = self.samples.clone();
        sorted.sort_unstable();

        let count = sorted.len();
        let total: Duration = sorted.iter().sum();
        let mean_nanos = total.as_nanos() / count as u128;

        let variance = sorted
            .iter()
            .map(|sample| {
                let diff = sample.as_nanos() as f64 - mean_nanos as f64;
                diff * diff
            })
            .sum::<f64>()
            / count as f64;

        Summary {
            count,
            empty: false,
            latency: Some(LatencyStats {
                min: sorted[0],
                max: sorted[count - 1],
                mean: nanos_to_duration(mean_nanos),
                stddev: Duration::from_nanos(variance.sqrt() as u64),
                total,
                p50: percentile(&sorted, 50.0),
                p90: percentile(&sorted, 90.0),
                p99: percentile(&sorted, 99.0),
            }),
        }
    }
}

impl Summary {
    pub fn empty() -> Self {
        Self {
            count: 0,
            empty: true,
            latency: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.latency.is_none()
    }
}

/// Nearest-rank percentile over already sorted samples
fn percentile(sorted: &[Duration], pct: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let upper = sorted.len() - 1;
    let position = ((pct / 100.0) * upper as f64).round() as usize;
    sorted[position.min(upper)]
}

fn nanos_to_duration(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Durations are reported as fractional milliseconds
pub(crate) fn as_millis<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_nanos() as f64 / 1_000_000.0)
}
